//! SQL data types
//!
//! The engine supports a fixed, closed set of scalar types identified by
//! their Postgres object ids. The set never changes at runtime; an oid that
//! does not resolve to a registered type is an engine bug, not user error.

use std::fmt;

use crate::error::{Error, Result};

/// Typemod value meaning "use the type's intrinsic fixed length".
pub const TYPEMOD_NONE: i32 = -1;

/// A registered scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    /// smallint, 2 bytes
    Int2,
    /// integer, 4 bytes
    Int4,
    /// bigint, 8 bytes
    Int8,
    /// fixed-length character; byte length comes from the column typemod
    Char,
}

impl TypeId {
    /// Every registered type.
    pub const ALL: [TypeId; 4] = [TypeId::Int2, TypeId::Int4, TypeId::Int8, TypeId::Char];

    /// Postgres object id of this type.
    pub fn oid(self) -> u32 {
        match self {
            TypeId::Int2 => 21,
            TypeId::Int4 => 23,
            TypeId::Int8 => 20,
            TypeId::Char => 18,
        }
    }

    /// Resolve a catalog-sourced oid back to a registered type.
    pub fn from_oid(oid: u32) -> Option<TypeId> {
        TypeId::ALL.iter().copied().find(|t| t.oid() == oid)
    }

    /// Human friendly name of the type.
    pub fn name(self) -> &'static str {
        match self {
            TypeId::Int2 => "int2",
            TypeId::Int4 => "int4",
            TypeId::Int8 => "int8",
            TypeId::Char => "char",
        }
    }

    /// Byte length, or `None` for variable-length types.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            TypeId::Int2 => Some(2),
            TypeId::Int4 => Some(4),
            TypeId::Int8 => Some(8),
            TypeId::Char => None,
        }
    }

    /// pg_type-style type length for row descriptors; negative values
    /// denote variable-width types.
    pub fn wire_len(self) -> i16 {
        match self.fixed_len() {
            Some(len) => len as i16,
            None => -1,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte length of a stored value of this type.
///
/// Fixed-width types ignore the typemod; variable-length types require a
/// non-negative typemod, already validated during resolution.
pub fn length_of(type_id: TypeId, typemod: i32) -> Result<usize> {
    if let Some(len) = type_id.fixed_len() {
        return Ok(len);
    }
    if typemod >= 0 {
        Ok(typemod as usize)
    } else {
        Err(Error::internal(format!(
            "variable-length type {} with typemod {}",
            type_id, typemod
        )))
    }
}
