//! Tuple encoding
//!
//! Fields are laid out back to back with no padding and no nullability
//! bitmap: integers little-endian at their fixed width, character data
//! zero-padded to the column's declared length. A column's byte offset is
//! the sum of the lengths of the columns before it.

use byteorder::{ByteOrder, LittleEndian};

/// Builds one tuple's bytes in column order.
#[derive(Default)]
pub struct TupleBuilder {
    buf: Vec<u8>,
}

impl TupleBuilder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append a smallint field.
    pub fn int2(mut self, value: i16) -> Self {
        let mut bytes = [0u8; 2];
        LittleEndian::write_i16(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Append an integer field.
    pub fn int4(mut self, value: i32) -> Self {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Append a bigint field.
    pub fn int8(mut self, value: i64) -> Self {
        let mut bytes = [0u8; 8];
        LittleEndian::write_i64(&mut bytes, value);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Append character data zero-padded to `len` bytes. Longer input is
    /// truncated.
    pub fn char_field(mut self, value: &str, len: usize) -> Self {
        let bytes = value.as_bytes();
        let n = bytes.len().min(len);
        self.buf.extend_from_slice(&bytes[..n]);
        self.buf.resize(self.buf.len() + (len - n), 0);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// The text of a stored char(n) field: the bytes up to the first NUL.
pub fn char_text(field: &[u8]) -> &[u8] {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    &field[..end]
}
