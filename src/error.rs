//! Error types for SlotDB
//!
//! Every user-facing failure carries what a Postgres-style wire layer needs
//! to build an ErrorResponse: a severity, a five-character SQLSTATE code, a
//! message, optional detail and hint strings, an optional 1-based position
//! into the query text, and the source location where the error was raised.
//! The core never formats protocol bytes itself.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Message severity levels, mirroring the Postgres error levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Log,
    Info,
    Debug,
    Notice,
    Warning,
    Error,
    Fatal,
    Panic,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Log => "LOG",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Panic => "PANIC",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of failure the engine reports.
///
/// Parsing and resolution stop at the first error; all kinds except
/// `Internal` are recoverable at the request boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token sequence; always carries a query position
    #[error("syntax error")]
    Syntax,

    /// Syntactically recognized but intentionally unimplemented construct
    #[error("feature not supported")]
    FeatureNotSupported,

    /// The FROM table does not exist in the catalog
    #[error("relation \"{0}\" does not exist")]
    UndefinedTable(String),

    /// A field reference matched no column of the source table
    #[error("column \"{0}\" does not exist")]
    UndefinedColumn(String),

    /// A tuple did not fit in the page's remaining free space
    #[error("page is full")]
    PageFull,

    /// Invariant violation; a bug in the engine, not in user input
    #[error("internal error: {0}")]
    Internal(String),
}

/// The main error type for SlotDB
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    detail: Option<String>,
    hint: Option<String>,
    position: Option<usize>,
    location: &'static Location<'static>,
}

impl Error {
    #[track_caller]
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            detail: None,
            hint: None,
            position: None,
            location: Location::caller(),
        }
    }

    /// Syntax error at a 1-based byte position in the query text.
    #[track_caller]
    pub fn syntax(detail: impl Into<String>, position: usize) -> Self {
        let mut err = Self::new(ErrorKind::Syntax);
        err.detail = Some(detail.into());
        err.position = Some(position);
        err
    }

    /// Recognized but unsupported construct at a 1-based position.
    #[track_caller]
    pub fn feature_not_supported(detail: impl Into<String>, position: usize) -> Self {
        let mut err = Self::new(ErrorKind::FeatureNotSupported);
        err.detail = Some(detail.into());
        err.position = Some(position);
        err
    }

    #[track_caller]
    pub fn undefined_table(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedTable(name.into()))
    }

    #[track_caller]
    pub fn undefined_column(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedColumn(name.into()))
    }

    #[track_caller]
    pub fn page_full() -> Self {
        Self::new(ErrorKind::PageFull)
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Attach a 1-based query position if none is set yet.
    pub fn at(mut self, position: usize) -> Self {
        self.position = self.position.or(Some(position));
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Five-character SQLSTATE code for the wire layer.
    pub fn sqlstate(&self) -> &'static str {
        match self.kind {
            ErrorKind::Syntax => "42601",
            ErrorKind::FeatureNotSupported => "0A000",
            ErrorKind::UndefinedTable(_) => "42P01",
            ErrorKind::UndefinedColumn(_) => "42703",
            ErrorKind::PageFull => "53100",
            ErrorKind::Internal(_) => "XX000",
        }
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            ErrorKind::Internal(_) => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Primary human-readable message.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// 1-based byte position into the query text, if known.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Source location where the error was raised.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Result type alias for SlotDB operations
pub type Result<T> = std::result::Result<T, Error>;
