//! Request entry point
//!
//! `handle_query` runs the full pipeline for one statement: lex and parse
//! into the request arena, resolve against the catalog, and hand back row
//! metadata plus a cursor over the rows. The wire layer owns framing and
//! rendering; this boundary owns everything up to the bytes of each field.
//!
//! The catalog, the table store, and the arena are explicit parameters, not
//! hidden state: the first two live for the process, the arena for exactly
//! one request.

use bumpalo::Bump;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::executor::{execute_create, resolve, Cursor, LogicalStatement, OutputColumn, SelectPlan};
use crate::sql::parser::Parser;
use crate::storage::table_store::TableStore;

/// Metadata for one result column, mirroring the fields of a Postgres
/// RowDescription entry.
#[derive(Debug, Clone, Copy)]
pub struct FieldDesc<'a> {
    /// Display name; `None` when the query gives the column no name and
    /// the wire layer falls back to `?column?`
    pub name: Option<&'a str>,
    /// Source table oid, 0 for computed columns
    pub table_oid: u32,
    /// 1-based source column number, 0 for computed columns
    pub column_ordinal: u16,
    /// Object id of the field's type
    pub type_oid: u32,
    /// pg_type-style length; negative denotes variable width
    pub type_len: i16,
    /// Type modifier
    pub typemod: i32,
}

/// Ordered result-column metadata for one statement.
#[derive(Debug, Clone, Copy)]
pub struct RowDescriptor<'a> {
    pub fields: &'a [FieldDesc<'a>],
}

impl<'a> RowDescriptor<'a> {
    fn empty() -> RowDescriptor<'a> {
        RowDescriptor { fields: &[] }
    }

    fn describe(plan: &SelectPlan<'a>, arena: &'a Bump) -> RowDescriptor<'a> {
        let mut fields = Vec::with_capacity(plan.outputs.len());
        for output in plan.outputs {
            let (table_oid, column_ordinal) = match output {
                OutputColumn::Field { index, .. } => match plan.table {
                    Some(table) => (
                        table.oid,
                        table.columns.get(*index).map(|c| c.ordinal).unwrap_or(0),
                    ),
                    None => (0, 0),
                },
                OutputColumn::Literal { .. } => (0, 0),
            };
            fields.push(FieldDesc {
                name: output.name(),
                table_oid,
                column_ordinal,
                type_oid: output.type_id().oid(),
                type_len: output.type_id().wire_len(),
                typemod: output.typemod(),
            });
        }
        RowDescriptor {
            fields: arena.alloc_slice_copy(&fields),
        }
    }
}

/// Parse, resolve, and prepare execution of one statement.
///
/// Returns the result-column metadata and a cursor streaming the rows. A
/// CREATE TABLE runs to completion here and returns an empty descriptor
/// with a rowless cursor.
pub fn handle_query<'a>(
    sql: &'a str,
    catalog: &'a mut Catalog,
    store: &'a mut TableStore,
    arena: &'a Bump,
) -> Result<(RowDescriptor<'a>, Cursor<'a>)> {
    debug!(query = sql, "handling query");

    let statement = Parser::new(sql, arena).parse()?;
    let logical = resolve(statement, catalog, arena)?;

    match logical {
        LogicalStatement::Create(plan) => {
            execute_create(plan, catalog, store)?;
            Ok((RowDescriptor::empty(), Cursor::empty(arena)))
        }
        LogicalStatement::Select(plan) => {
            let descriptor = RowDescriptor::describe(plan, arena);
            let catalog = &*catalog;
            let store = &*store;
            let cursor = match plan.table {
                Some(table) => {
                    let page = store
                        .page(table.oid)
                        .or_else(|| catalog.storage_for(table.oid))
                        .ok_or_else(|| {
                            Error::internal(format!("no storage for table oid {}", table.oid))
                        })?;
                    Cursor::scan(arena, plan, page)?
                }
                None => Cursor::synthetic(arena, plan),
            };
            Ok((descriptor, cursor))
        }
    }
}
