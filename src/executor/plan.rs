//! Resolved logical statements
//!
//! The typed, catalog-bound counterpart of the parse tree. Each variant
//! carries everything execution needs; the absence of a field for a given
//! variant is a compile-time guarantee, not a runtime convention.

use crate::catalog::schema::{Column, Table};
use crate::catalog::types::TypeId;

/// A fully resolved statement ready for execution.
#[derive(Debug, Clone, Copy)]
pub enum LogicalStatement<'a> {
    Select(&'a SelectPlan<'a>),
    Create(&'a CreatePlan<'a>),
}

/// Typed SELECT: output columns plus an optional source table.
#[derive(Debug, Clone, Copy)]
pub struct SelectPlan<'a> {
    pub outputs: &'a [OutputColumn<'a>],
    pub table: Option<Table<'a>>,
}

/// One column of the result set.
#[derive(Debug, Clone, Copy)]
pub enum OutputColumn<'a> {
    /// A column of the source table
    Field {
        /// Index into the source table's column list
        index: usize,
        type_id: TypeId,
        typemod: i32,
        name: Option<&'a str>,
    },
    /// A constant from the query text
    Literal {
        value: Literal<'a>,
        type_id: TypeId,
        typemod: i32,
        name: Option<&'a str>,
    },
}

impl<'a> OutputColumn<'a> {
    /// Display name: the alias, or the column name for fields.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            OutputColumn::Field { name, .. } | OutputColumn::Literal { name, .. } => *name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            OutputColumn::Field { type_id, .. } | OutputColumn::Literal { type_id, .. } => *type_id,
        }
    }

    pub fn typemod(&self) -> i32 {
        match self {
            OutputColumn::Field { typemod, .. } | OutputColumn::Literal { typemod, .. } => *typemod,
        }
    }
}

/// A literal value from the select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal<'a> {
    Int(i64),
    Str(&'a str),
}

/// Typed CREATE TABLE: name plus resolved columns with 1-based ordinals.
#[derive(Debug, Clone, Copy)]
pub struct CreatePlan<'a> {
    pub table_name: &'a str,
    pub columns: &'a [Column<'a>],
}
