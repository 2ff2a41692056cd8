//! Name and type resolution
//!
//! Binds the parse tree to the catalog: expands `*` into concrete columns,
//! resolves field references against the source table, and assigns literal
//! types. Column names match case-sensitively even though keywords do not;
//! the engine keeps that asymmetry rather than unifying it.

use bumpalo::Bump;

use super::plan::{CreatePlan, Literal, LogicalStatement, OutputColumn, SelectPlan};
use crate::catalog::schema::Column;
use crate::catalog::types::{TypeId, TYPEMOD_NONE};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::sql::ast::{ColumnDef, CreateStmt, SelectExprKind, SelectStmt, Statement};

/// Resolve a parsed statement into its logical form.
pub fn resolve<'a>(
    statement: Statement<'a>,
    catalog: &Catalog,
    arena: &'a Bump,
) -> Result<LogicalStatement<'a>> {
    match statement {
        Statement::Select(select) => {
            let plan = resolve_select(select, catalog, arena)?;
            Ok(LogicalStatement::Select(arena.alloc(plan)))
        }
        Statement::Create(create) => {
            let plan = resolve_create(create, arena)?;
            Ok(LogicalStatement::Create(arena.alloc(plan)))
        }
    }
}

fn resolve_select<'a>(
    stmt: &SelectStmt<'a>,
    catalog: &Catalog,
    arena: &'a Bump,
) -> Result<SelectPlan<'a>> {
    let table = match stmt.from {
        Some(table_ref) => Some(
            catalog
                .lookup_table_by_name(table_ref.name, arena)
                .map_err(|err| err.at(table_ref.span.pos()))?,
        ),
        None => None,
    };

    let mut outputs: Vec<OutputColumn<'a>> = Vec::new();
    for expr in stmt.select_list {
        match expr.kind {
            SelectExprKind::Star => {
                // The parser rejects a star without a FROM clause.
                let table = table
                    .as_ref()
                    .ok_or_else(|| Error::internal("star expansion without a source table"))?;
                for (index, column) in table.columns.iter().enumerate() {
                    outputs.push(OutputColumn::Field {
                        index,
                        type_id: column.type_id,
                        typemod: column.typemod,
                        name: Some(column.name),
                    });
                }
            }
            SelectExprKind::Field(name) => {
                let table = match table.as_ref() {
                    Some(table) => table,
                    None => return Err(Error::undefined_column(name).at(expr.span.pos())),
                };
                let index = table
                    .column_index(name)
                    .ok_or_else(|| Error::undefined_column(name).at(expr.span.pos()))?;
                let column = &table.columns[index];
                outputs.push(OutputColumn::Field {
                    index,
                    type_id: column.type_id,
                    typemod: column.typemod,
                    name: Some(expr.alias.unwrap_or(column.name)),
                });
            }
            SelectExprKind::Number(value) => {
                outputs.push(OutputColumn::Literal {
                    value: Literal::Int(value),
                    type_id: TypeId::Int4,
                    typemod: TYPEMOD_NONE,
                    name: expr.alias,
                });
            }
            SelectExprKind::Str(value) => {
                outputs.push(OutputColumn::Literal {
                    value: Literal::Str(value),
                    type_id: TypeId::Char,
                    typemod: value.len() as i32,
                    name: expr.alias,
                });
            }
        }
    }

    Ok(SelectPlan {
        outputs: arena.alloc_slice_copy(&outputs),
        table,
    })
}

fn resolve_create<'a>(stmt: &CreateStmt<'a>, arena: &'a Bump) -> Result<CreatePlan<'a>> {
    let mut columns: Vec<Column<'a>> = Vec::new();
    for (position, def) in stmt.columns.iter().enumerate() {
        columns.push(resolve_column_def(def, position as u16 + 1)?);
    }
    Ok(CreatePlan {
        table_name: stmt.table_name,
        columns: arena.alloc_slice_copy(&columns),
    })
}

fn resolve_column_def<'a>(def: &ColumnDef<'a>, ordinal: u16) -> Result<Column<'a>> {
    let type_id = def
        .type_kw
        .type_id()
        .ok_or_else(|| Error::syntax("expected a type name", def.span.pos()))?;

    let typemod = match (type_id.fixed_len(), def.length) {
        (Some(_), Some(_)) => {
            return Err(Error::syntax(
                "type does not take a length argument",
                def.span.pos(),
            ))
        }
        (Some(_), None) => TYPEMOD_NONE,
        (None, Some(length)) => length as i32,
        // char without an explicit length is char(1)
        (None, None) => 1,
    };

    Ok(Column {
        name: def.name,
        ordinal,
        type_id,
        typemod,
    })
}
