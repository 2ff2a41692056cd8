//! Query execution module
//!
//! This module contains the resolver, the logical statement types, and the
//! cursor-based executor.

pub mod create;
pub mod cursor;
pub mod plan;
pub mod resolver;

pub use create::execute_create;
pub use cursor::{Cursor, Row, RowField};
pub use plan::{CreatePlan, Literal, LogicalStatement, OutputColumn, SelectPlan};
pub use resolver::resolve;
