//! Slotted heap pages
//!
//! Each table's storage is a single fixed-size page: a small header, a slot
//! directory growing up from the header, and tuple bytes growing down from
//! the end of the page. Slot numbers give tuples a stable logical identity
//! independent of their physical offset. Tuples are append-only; there is
//! no update, delete, or compaction, so the slot count only grows.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Page size in bytes (16 KiB)
pub const PAGE_SIZE: usize = 16 * 1024;

/// Current version of the heap page layout
const PAGE_VERSION: u8 = 1;

/// Header layout: version (u8), free_low (u16), free_high (u16).
/// free_low is the offset to the beginning of free space, free_high the
/// offset to its end; the two never cross.
const HEADER_SIZE: usize = 5;
const FREE_LOW_OFFSET: usize = 1;
const FREE_HIGH_OFFSET: usize = 3;

/// Slot entry layout: tuple offset (u16), tuple length (u16)
const SLOT_SIZE: usize = 4;

/// A fixed-size slotted page holding variable-length tuples.
///
/// All bookkeeping lives inside the page bytes themselves; there is no
/// shadow header struct to drift out of sync.
pub struct HeapPage {
    data: Box<[u8; PAGE_SIZE]>,
}

impl HeapPage {
    /// Create a zeroed page with an empty slot directory.
    pub fn new() -> Self {
        let mut page = Self {
            data: Box::new([0u8; PAGE_SIZE]),
        };
        page.data[0] = PAGE_VERSION;
        page.set_free_low(HEADER_SIZE as u16);
        page.set_free_high(PAGE_SIZE as u16);
        page
    }

    fn free_low(&self) -> u16 {
        LittleEndian::read_u16(&self.data[FREE_LOW_OFFSET..FREE_LOW_OFFSET + 2])
    }

    fn set_free_low(&mut self, value: u16) {
        LittleEndian::write_u16(&mut self.data[FREE_LOW_OFFSET..FREE_LOW_OFFSET + 2], value);
    }

    fn free_high(&self) -> u16 {
        LittleEndian::read_u16(&self.data[FREE_HIGH_OFFSET..FREE_HIGH_OFFSET + 2])
    }

    fn set_free_high(&mut self, value: u16) {
        LittleEndian::write_u16(&mut self.data[FREE_HIGH_OFFSET..FREE_HIGH_OFFSET + 2], value);
    }

    /// Number of slots in use, derived from the slot directory size.
    pub fn slot_count(&self) -> u16 {
        ((self.free_low() as usize - HEADER_SIZE) / SLOT_SIZE) as u16
    }

    /// Free bytes remaining between the slot directory and the tuple area.
    pub fn free_space(&self) -> usize {
        self.free_high() as usize - self.free_low() as usize
    }

    /// Append a tuple, returning its slot number.
    ///
    /// Fails with `PageFull` before touching the page when the slot entry
    /// plus the tuple bytes do not fit in the remaining free space.
    pub fn insert_tuple(&mut self, tuple: &[u8]) -> Result<u16> {
        let free_low = self.free_low() as usize;
        let free_high = self.free_high() as usize;

        if free_low + SLOT_SIZE + tuple.len() > free_high {
            return Err(Error::page_full());
        }

        let slotno = self.slot_count();
        let offset = free_high - tuple.len();
        let slot = HEADER_SIZE + slotno as usize * SLOT_SIZE;

        LittleEndian::write_u16(&mut self.data[slot..slot + 2], offset as u16);
        LittleEndian::write_u16(&mut self.data[slot + 2..slot + 4], tuple.len() as u16);
        self.data[offset..offset + tuple.len()].copy_from_slice(tuple);

        self.set_free_low((free_low + SLOT_SIZE) as u16);
        self.set_free_high(offset as u16);

        Ok(slotno)
    }

    /// Borrow the tuple stored in the given slot. No copy is made; the view
    /// is valid as long as the page is.
    pub fn tuple(&self, slotno: u16) -> Option<&[u8]> {
        if slotno >= self.slot_count() {
            return None;
        }
        let slot = HEADER_SIZE + slotno as usize * SLOT_SIZE;
        let offset = LittleEndian::read_u16(&self.data[slot..slot + 2]) as usize;
        let len = LittleEndian::read_u16(&self.data[slot + 2..slot + 4]) as usize;
        Some(&self.data[offset..offset + len])
    }
}

impl Default for HeapPage {
    fn default() -> Self {
        Self::new()
    }
}
