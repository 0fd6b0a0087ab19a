//! Sink error types.

use thiserror::Error;

/// Result type alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors raised by a [`Sink`](crate::Sink).
#[derive(Debug, Error)]
pub enum SinkError {
    /// No schema was created under this name.
    #[error("unknown table: {name}")]
    UnknownTable { name: String },

    /// The call does not fit the table's schema.
    #[error("schema error on {table}: {message}")]
    Schema { table: String, message: String },

    /// Reading the incoming table failed.
    #[error(transparent)]
    Table(#[from] tally_core::Error),

    /// Storage engine failure.
    #[error("backend failure: {message}")]
    Backend { message: String },
}

impl SinkError {
    /// Creates a schema error.
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Schema {
            table: table.into(),
            message: message.into(),
        }
    }
}
