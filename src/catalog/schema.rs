//! Table and column metadata
//!
//! Metadata handed out by the catalog borrows its names from the request
//! arena, so everything resolved for one query is released together with
//! the rest of the request's allocations.

use crate::catalog::types::TypeId;

/// Column definition within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    /// Column name
    pub name: &'a str,
    /// 1-based position of the column within its table
    pub ordinal: u16,
    /// Data type
    pub type_id: TypeId,
    /// Type modifier; -1 means the type's intrinsic fixed length
    pub typemod: i32,
}

/// Table metadata: identity plus the ordered column list.
///
/// Column order is significant: it defines the physical tuple layout and is
/// never reordered.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    /// Table oid assigned at registration; 0 before the table is registered
    pub oid: u32,
    /// Table name
    pub name: &'a str,
    /// Columns in physical tuple order
    pub columns: &'a [Column<'a>],
}

impl<'a> Table<'a> {
    /// Find a column by name. Matching is exact and case-sensitive;
    /// keywords are the only case-insensitive names in the engine.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::TYPEMOD_NONE;

    fn sample_table<'a>(columns: &'a [Column<'a>]) -> Table<'a> {
        Table {
            oid: 7,
            name: "sample",
            columns,
        }
    }

    #[test]
    fn test_column_index_is_case_sensitive() {
        let columns = [
            Column {
                name: "id",
                ordinal: 1,
                type_id: TypeId::Int4,
                typemod: TYPEMOD_NONE,
            },
            Column {
                name: "Name",
                ordinal: 2,
                type_id: TypeId::Char,
                typemod: 16,
            },
        ];
        let table = sample_table(&columns);

        assert_eq!(table.column_index("id"), Some(0));
        assert_eq!(table.column_index("Name"), Some(1));
        assert_eq!(table.column_index("name"), None);
        assert_eq!(table.column_index("ID"), None);
        assert_eq!(table.column_index("missing"), None);
    }
}
