//! Cursors and row evaluation
//!
//! A cursor is a finite, forward-only stream of one statement's result
//! rows. Field values are sliced straight out of the table's heap page at
//! column offsets precomputed once when the scan opens; everything a row
//! materializes beyond those slices lands in the request arena. Output
//! fields are in text format, which the wire layer forwards verbatim.

use bumpalo::Bump;
use byteorder::{ByteOrder, LittleEndian};

use super::plan::{Literal, OutputColumn, SelectPlan};
use crate::catalog::schema::Table;
use crate::catalog::types::{length_of, TypeId};
use crate::error::{Error, Result};
use crate::storage::page::HeapPage;
use crate::storage::tuple::char_text;

/// One output row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub fields: &'a [RowField<'a>],
}

/// One field of an output row.
#[derive(Debug, Clone, Copy)]
pub struct RowField<'a> {
    pub bytes: &'a [u8],
}

impl RowField<'_> {
    /// Field length in bytes, as the wire layer serializes it.
    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Scan state over a table's single heap page.
struct TableScan<'a> {
    page: &'a HeapPage,
    /// Byte offset of each column within a tuple
    offsets: &'a [usize],
    next_slot: u16,
    slot_count: u16,
}

/// Streams the rows of one statement.
///
/// A select with a source table walks the page slot by slot; a table-less
/// select produces exactly one synthetic row; DDL cursors start exhausted.
pub struct Cursor<'a> {
    arena: &'a Bump,
    plan: Option<&'a SelectPlan<'a>>,
    scan: Option<TableScan<'a>>,
    exhausted: bool,
}

impl<'a> Cursor<'a> {
    /// Open a full scan of the plan's source table, positioned at slot 0.
    pub(crate) fn scan(
        arena: &'a Bump,
        plan: &'a SelectPlan<'a>,
        page: &'a HeapPage,
    ) -> Result<Cursor<'a>> {
        let table = plan
            .table
            .ok_or_else(|| Error::internal("table scan without a source table"))?;
        let offsets = column_offsets(&table, arena)?;

        Ok(Cursor {
            arena,
            plan: Some(plan),
            scan: Some(TableScan {
                page,
                offsets,
                next_slot: 0,
                slot_count: page.slot_count(),
            }),
            exhausted: false,
        })
    }

    /// Cursor for a table-less select: one synthetic row.
    pub(crate) fn synthetic(arena: &'a Bump, plan: &'a SelectPlan<'a>) -> Cursor<'a> {
        Cursor {
            arena,
            plan: Some(plan),
            scan: None,
            exhausted: false,
        }
    }

    /// Cursor that yields no rows.
    pub(crate) fn empty(arena: &'a Bump) -> Cursor<'a> {
        Cursor {
            arena,
            plan: None,
            scan: None,
            exhausted: true,
        }
    }

    fn next_row(&mut self) -> Result<Option<Row<'a>>> {
        if self.exhausted {
            return Ok(None);
        }
        let plan = match self.plan {
            Some(plan) => plan,
            None => {
                self.exhausted = true;
                return Ok(None);
            }
        };

        let tuple = match self.scan.as_mut() {
            Some(scan) => {
                if scan.next_slot >= scan.slot_count {
                    self.exhausted = true;
                    return Ok(None);
                }
                let page: &'a HeapPage = scan.page;
                let tuple = match page.tuple(scan.next_slot) {
                    Some(tuple) => tuple,
                    None => {
                        self.exhausted = true;
                        return Ok(None);
                    }
                };
                scan.next_slot += 1;
                Some(tuple)
            }
            None => {
                // The single synthetic row.
                self.exhausted = true;
                None
            }
        };

        let mut fields = Vec::with_capacity(plan.outputs.len());
        for output in plan.outputs {
            fields.push(self.eval(output, tuple)?);
        }
        Ok(Some(Row {
            fields: self.arena.alloc_slice_copy(&fields),
        }))
    }

    fn eval(&self, output: &OutputColumn<'a>, tuple: Option<&'a [u8]>) -> Result<RowField<'a>> {
        match output {
            OutputColumn::Field {
                index,
                type_id,
                typemod,
                ..
            } => {
                let scan = self
                    .scan
                    .as_ref()
                    .ok_or_else(|| Error::internal("field reference without a table scan"))?;
                let tuple =
                    tuple.ok_or_else(|| Error::internal("field reference without a tuple"))?;
                let offset = *scan
                    .offsets
                    .get(*index)
                    .ok_or_else(|| Error::internal("column index out of range"))?;
                let len = length_of(*type_id, *typemod)?;
                let raw = tuple.get(offset..offset + len).ok_or_else(|| {
                    Error::internal(format!("tuple too short for column {}", index))
                })?;
                Ok(RowField {
                    bytes: self.text_of(*type_id, raw),
                })
            }
            OutputColumn::Literal { value, .. } => match value {
                Literal::Int(value) => {
                    let text: &'a str = self.arena.alloc_str(&value.to_string());
                    Ok(RowField {
                        bytes: text.as_bytes(),
                    })
                }
                Literal::Str(value) => Ok(RowField {
                    bytes: value.as_bytes(),
                }),
            },
        }
    }

    /// Render a stored field into its text form. Char fields stay borrowed
    /// from the page; integers are formatted into the arena.
    fn text_of(&self, type_id: TypeId, raw: &'a [u8]) -> &'a [u8] {
        let text = match type_id {
            TypeId::Int2 => LittleEndian::read_i16(raw).to_string(),
            TypeId::Int4 => LittleEndian::read_i32(raw).to_string(),
            TypeId::Int8 => LittleEndian::read_i64(raw).to_string(),
            TypeId::Char => return char_text(raw),
        };
        let text: &'a str = self.arena.alloc_str(&text);
        text.as_bytes()
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = Result<Row<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

/// Byte offset of each column: the sum of the lengths of the columns before
/// it, with no padding or alignment.
fn column_offsets<'a>(table: &Table<'a>, arena: &'a Bump) -> Result<&'a [usize]> {
    let mut offsets = Vec::with_capacity(table.columns.len());
    let mut offset = 0usize;
    for column in table.columns {
        offsets.push(offset);
        offset += length_of(column.type_id, column.typemod)?;
    }
    Ok(arena.alloc_slice_copy(&offsets))
}
