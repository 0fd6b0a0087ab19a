//! Error types for table operations.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Result type alias for table operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by [`Table`](crate::Table) and [`Column`](crate::Column).
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Column length or shape does not fit the table.
    Schema {
        message: String,
    },
    /// Two tables do not share the same ordered column names.
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Named column does not exist.
    ColumnNotFound {
        column: String,
    },
    /// A column required up front is absent.
    MissingColumn {
        column: String,
    },
    /// A column with this name is already present.
    DuplicateColumn {
        column: String,
    },
    /// Row index past the end of a column.
    RowOutOfRange {
        row: usize,
        len: usize,
    },
    /// Invalid `[start, end)` row range.
    Range {
        start: usize,
        end: usize,
        len: usize,
    },
    /// Unknown comparison operator or malformed mask.
    InvalidPredicate {
        message: String,
    },
    /// Cell could not be read as a number.
    Parse {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema { message } => write!(f, "Schema error: {}", message),
            Error::SchemaMismatch { left, right } => {
                write!(f, "Schema mismatch: {:?} vs {:?}", left, right)
            }
            Error::ColumnNotFound { column } => write!(f, "Column not found: {}", column),
            Error::MissingColumn { column } => write!(f, "Missing required column: {}", column),
            Error::DuplicateColumn { column } => write!(f, "Duplicate column: {}", column),
            Error::RowOutOfRange { row, len } => {
                write!(f, "Row {} out of range for column of length {}", row, len)
            }
            Error::Range { start, end, len } => {
                write!(f, "Invalid row range [{}, {}) for {} rows", start, end, len)
            }
            Error::InvalidPredicate { message } => write!(f, "Invalid predicate: {}", message),
            Error::Parse { column, row, value } => {
                write!(
                    f,
                    "Cannot parse {:?} as a number (column {}, row {})",
                    value, column, row
                )
            }
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Error::Schema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }

    /// Creates a row out of range error.
    pub fn row_out_of_range(row: usize, len: usize) -> Self {
        Error::RowOutOfRange { row, len }
    }

    /// Creates a range error.
    pub fn range(start: usize, end: usize, len: usize) -> Self {
        Error::Range { start, end, len }
    }

    /// Creates an invalid predicate error.
    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Error::InvalidPredicate {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(column: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        Error::Parse {
            column: column.into(),
            row,
            value: value.into(),
        }
    }
}
