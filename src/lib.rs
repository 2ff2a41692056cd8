//! SlotDB - A minimal relational database engine written in Rust
//!
//! This library provides the query pipeline of a small Postgres-flavored
//! database:
//! - SQL parsing (lexer, parser, arena-allocated parse tree)
//! - Catalog-bound name and type resolution
//! - Cursor-based execution over slotted in-memory heap pages
//! - A system catalog that stores itself in the page format it describes
//!
//! A wire-protocol layer is expected to sit on top of
//! [`session::handle_query`]; nothing in here writes protocol bytes.

pub mod catalog;
pub mod error;
pub mod executor;
pub mod session;
pub mod sql;
pub mod storage;

pub use error::{Error, ErrorKind, Result, Severity};
pub use session::{handle_query, FieldDesc, RowDescriptor};
