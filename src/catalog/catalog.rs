//! System catalog
//!
//! The catalog is two bootstrap tables, `tables` and `columns`, stored in
//! the same slotted heap pages as user data. Bootstrap registers both
//! schemas through the normal registration path, so each table's own
//! descriptor row lands in the page it describes. Lookups are linear scans;
//! insertion order into the `columns` page defines column ordinals.

use bumpalo::Bump;
use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, info};

use crate::catalog::schema::{Column, Table};
use crate::catalog::types::{TypeId, TYPEMOD_NONE};
use crate::error::{Error, Result};
use crate::storage::page::HeapPage;
use crate::storage::tuple::{char_text, TupleBuilder};

/// Maximum length of table and column names stored in the catalog.
pub const NAME_LEN: usize = 64;

/// Row layout of `tables`: (oid int4, name char(64))
const TABLES_TUPLE_LEN: usize = 4 + NAME_LEN;
/// Row layout of `columns`: (oid int4, tableoid int4, name char(64),
/// typeoid int4, typemod int4)
const COLUMNS_TUPLE_LEN: usize = 4 + 4 + NAME_LEN + 4 + 4;

/// The system catalog: table metadata stored in heap pages, plus the oid
/// sequences. Constructed once at process start and passed by reference
/// into every entry point; callers wanting concurrent registration wrap it
/// in their own lock.
pub struct Catalog {
    tables_page: HeapPage,
    columns_page: HeapPage,
    tables_oid: u32,
    columns_oid: u32,
    table_oid_seq: u32,
    column_oid_seq: u32,
}

impl Catalog {
    /// Create the catalog pages and register the two bootstrap schemas
    /// through the normal registration path. At the moment the `tables` row
    /// is appended its page and schema already exist, so the table
    /// describes itself without any special case in `register_table`.
    pub fn bootstrap() -> Result<Catalog> {
        let mut catalog = Catalog {
            tables_page: HeapPage::new(),
            columns_page: HeapPage::new(),
            tables_oid: 0,
            columns_oid: 0,
            table_oid_seq: 1,
            column_oid_seq: 1,
        };

        let tables = Table {
            oid: 0,
            name: "tables",
            columns: &[
                Column {
                    name: "oid",
                    ordinal: 1,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
                Column {
                    name: "name",
                    ordinal: 2,
                    type_id: TypeId::Char,
                    typemod: NAME_LEN as i32,
                },
            ],
        };
        catalog.tables_oid = catalog.register_table(&tables)?;

        let columns = Table {
            oid: 0,
            name: "columns",
            columns: &[
                Column {
                    name: "oid",
                    ordinal: 1,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
                Column {
                    name: "tableoid",
                    ordinal: 2,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
                Column {
                    name: "name",
                    ordinal: 3,
                    type_id: TypeId::Char,
                    typemod: NAME_LEN as i32,
                },
                Column {
                    name: "typeoid",
                    ordinal: 4,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
                Column {
                    name: "typemod",
                    ordinal: 5,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
            ],
        };
        catalog.columns_oid = catalog.register_table(&columns)?;

        info!(
            tables_oid = catalog.tables_oid,
            columns_oid = catalog.columns_oid,
            "catalog bootstrap complete"
        );
        Ok(catalog)
    }

    /// Register a table: one row in `tables`, one row per column in
    /// `columns`. Returns the assigned table oid.
    ///
    /// Catalog pages are never resized, so a full page here is fatal for
    /// the process, not a recoverable request error.
    pub fn register_table(&mut self, table: &Table<'_>) -> Result<u32> {
        let oid = self.table_oid_seq;
        self.table_oid_seq += 1;

        let row = TupleBuilder::new()
            .int4(oid as i32)
            .char_field(table.name, NAME_LEN)
            .finish();
        self.tables_page.insert_tuple(&row)?;

        for column in table.columns {
            let column_oid = self.column_oid_seq;
            self.column_oid_seq += 1;

            let row = TupleBuilder::new()
                .int4(column_oid as i32)
                .int4(oid as i32)
                .char_field(column.name, NAME_LEN)
                .int4(column.type_id.oid() as i32)
                .int4(column.typemod)
                .finish();
            self.columns_page.insert_tuple(&row)?;
        }

        debug!(name = table.name, oid, "registered table");
        Ok(oid)
    }

    /// Look up a table by exact name. Scans `tables` for the name, then
    /// `columns` for the rows with a matching tableoid; insertion order of
    /// those rows is the column order. Linear scans are fine at catalog
    /// scale.
    pub fn lookup_table_by_name<'a>(&self, name: &str, arena: &'a Bump) -> Result<Table<'a>> {
        let mut found: Option<(u32, &'a str)> = None;
        for slotno in 0..self.tables_page.slot_count() {
            let tuple = match self.tables_page.tuple(slotno) {
                Some(tuple) => tuple,
                None => break,
            };
            if tuple.len() != TABLES_TUPLE_LEN {
                return Err(Error::internal(format!(
                    "malformed tables row in slot {}",
                    slotno
                )));
            }
            if char_text(&tuple[4..4 + NAME_LEN]) == name.as_bytes() {
                let oid = LittleEndian::read_i32(&tuple[0..4]) as u32;
                found = Some((oid, &*arena.alloc_str(name)));
                break;
            }
        }

        let (oid, table_name) = match found {
            Some(found) => found,
            None => return Err(Error::undefined_table(name)),
        };

        let mut columns: Vec<Column<'a>> = Vec::new();
        for slotno in 0..self.columns_page.slot_count() {
            let tuple = match self.columns_page.tuple(slotno) {
                Some(tuple) => tuple,
                None => break,
            };
            if tuple.len() != COLUMNS_TUPLE_LEN {
                return Err(Error::internal(format!(
                    "malformed columns row in slot {}",
                    slotno
                )));
            }
            if LittleEndian::read_i32(&tuple[4..8]) as u32 != oid {
                continue;
            }

            let raw_name = char_text(&tuple[8..8 + NAME_LEN]);
            let column_name = std::str::from_utf8(raw_name)
                .map_err(|_| Error::internal("non-utf8 column name in catalog"))?;
            let typeoid = LittleEndian::read_i32(&tuple[8 + NAME_LEN..12 + NAME_LEN]) as u32;
            let typemod = LittleEndian::read_i32(&tuple[12 + NAME_LEN..16 + NAME_LEN]);
            let type_id = TypeId::from_oid(typeoid).ok_or_else(|| {
                Error::internal(format!(
                    "unknown type oid {} for column {}",
                    typeoid, column_name
                ))
            })?;

            columns.push(Column {
                name: arena.alloc_str(column_name),
                ordinal: columns.len() as u16 + 1,
                type_id,
                typemod,
            });
        }

        if columns.is_empty() {
            return Err(Error::internal(format!(
                "table {} has no columns in the catalog",
                table_name
            )));
        }

        Ok(Table {
            oid,
            name: table_name,
            columns: arena.alloc_slice_copy(&columns),
        })
    }

    /// Page backing one of the two catalog tables, so scans can read the
    /// catalog through the same path as user tables.
    pub fn storage_for(&self, oid: u32) -> Option<&HeapPage> {
        if oid == self.tables_oid {
            Some(&self.tables_page)
        } else if oid == self.columns_oid {
            Some(&self.columns_page)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_bootstrap_is_self_describing() {
        let catalog = Catalog::bootstrap().unwrap();
        let arena = Bump::new();

        let tables = catalog.lookup_table_by_name("tables", &arena).unwrap();
        assert_eq!(tables.name, "tables");
        assert!(tables.oid > 0);
        let described: Vec<_> = tables
            .columns
            .iter()
            .map(|c| (c.name, c.type_id, c.typemod))
            .collect();
        assert_eq!(
            described,
            vec![
                ("oid", TypeId::Int4, TYPEMOD_NONE),
                ("name", TypeId::Char, NAME_LEN as i32),
            ]
        );

        let columns = catalog.lookup_table_by_name("columns", &arena).unwrap();
        assert_eq!(columns.name, "columns");
        assert_ne!(columns.oid, tables.oid);
        let described: Vec<_> = columns
            .columns
            .iter()
            .map(|c| (c.name, c.type_id, c.typemod))
            .collect();
        assert_eq!(
            described,
            vec![
                ("oid", TypeId::Int4, TYPEMOD_NONE),
                ("tableoid", TypeId::Int4, TYPEMOD_NONE),
                ("name", TypeId::Char, NAME_LEN as i32),
                ("typeoid", TypeId::Int4, TYPEMOD_NONE),
                ("typemod", TypeId::Int4, TYPEMOD_NONE),
            ]
        );
    }

    #[test]
    fn test_register_and_lookup_round_trip() {
        let mut catalog = Catalog::bootstrap().unwrap();
        let arena = Bump::new();

        let foo = Table {
            oid: 0,
            name: "foo",
            columns: &[
                Column {
                    name: "a",
                    ordinal: 1,
                    type_id: TypeId::Char,
                    typemod: 5,
                },
                Column {
                    name: "b",
                    ordinal: 2,
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                },
            ],
        };
        let oid = catalog.register_table(&foo).unwrap();
        assert!(oid > 2);

        let loaded = catalog.lookup_table_by_name("foo", &arena).unwrap();
        assert_eq!(loaded.oid, oid);
        assert_eq!(loaded.name, "foo");
        assert_eq!(loaded.columns.len(), 2);
        assert_eq!(loaded.columns[0].name, "a");
        assert_eq!(loaded.columns[0].ordinal, 1);
        assert_eq!(loaded.columns[0].type_id, TypeId::Char);
        assert_eq!(loaded.columns[0].typemod, 5);
        assert_eq!(loaded.columns[1].name, "b");
        assert_eq!(loaded.columns[1].ordinal, 2);
        assert_eq!(loaded.columns[1].type_id, TypeId::Int4);
        assert_eq!(loaded.columns[1].typemod, TYPEMOD_NONE);
    }

    #[test]
    fn test_oids_are_unique_and_increasing() {
        let mut catalog = Catalog::bootstrap().unwrap();

        let column = [Column {
            name: "x",
            ordinal: 1,
            type_id: TypeId::Int4,
            typemod: TYPEMOD_NONE,
        }];
        let mut oids = Vec::new();
        for name in ["t1", "t2", "t3"] {
            let table = Table {
                oid: 0,
                name,
                columns: &column,
            };
            oids.push(catalog.register_table(&table).unwrap());
        }

        assert!(oids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_lookup_unknown_table() {
        let catalog = Catalog::bootstrap().unwrap();
        let arena = Bump::new();

        let err = catalog.lookup_table_by_name("missing", &arena).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UndefinedTable(name) if name == "missing"
        ));
    }

    #[test]
    fn test_storage_for_catalog_tables() {
        let catalog = Catalog::bootstrap().unwrap();
        let arena = Bump::new();

        let tables = catalog.lookup_table_by_name("tables", &arena).unwrap();
        let page = catalog.storage_for(tables.oid).unwrap();
        // One descriptor row per bootstrap table.
        assert_eq!(page.slot_count(), 2);

        assert!(catalog.storage_for(999).is_none());
    }
}
