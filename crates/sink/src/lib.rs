//! Tally Sink - durable destination for merged aggregates.
//!
//! A [`Sink`] stores keyed tables. [`Sink::upsert`] adds incoming numeric
//! values to the stored ones for matching keys; [`Sink::overwrite`] replaces
//! them. Implementations serialize writes internally, so a sink may be shared
//! across threads behind an `Arc`.
//!
//! ```
//! use tally_core::{DataType, Table};
//! use tally_sink::{MemorySink, SchemaSpec, Sink};
//!
//! let sink = MemorySink::new();
//! let schema = SchemaSpec::new()
//!     .key("payment_method", DataType::String)
//!     .value("price", DataType::Float64);
//! sink.create_schema("revenue_by_method", &schema).unwrap();
//!
//! let batch = Table::from_rows(
//!     &["payment_method", "price"],
//!     vec![vec!["pix".into(), "10".into()]],
//! )
//! .unwrap();
//! sink.upsert("revenue_by_method", &batch, &["payment_method"], &["price"]).unwrap();
//! sink.upsert("revenue_by_method", &batch, &["payment_method"], &["price"]).unwrap();
//! let stored = sink.snapshot("revenue_by_method").unwrap();
//! assert_eq!(stored.get_value("price", 0).unwrap().as_f64(), Some(20.0));
//! ```

mod error;
mod memory;
mod schema;

pub use error::{Result, SinkError};
pub use memory::MemorySink;
pub use schema::{ColumnSpec, RowFailure, SchemaSpec, UpsertReport};

use tally_core::Table;

/// Conflict behavior for a keyed write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Add numeric values to the stored ones.
    Accumulate,
    /// Replace the stored values.
    Replace,
}

/// Keyed table storage.
pub trait Sink: Send + Sync {
    /// Creates `name` unless it already exists.
    fn create_schema(&self, name: &str, schema: &SchemaSpec) -> Result<()>;

    /// Writes every row of `table`, adding to existing values on key conflict.
    ///
    /// Rows that cannot be written are listed in the report; the rest are
    /// still written.
    fn upsert(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport>;

    /// Writes every row of `table`, replacing existing values on key conflict.
    fn overwrite(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport>;

    /// Reads `name` back, rows sorted by key.
    fn snapshot(&self, name: &str) -> Result<Table>;

    /// Writes with an explicit [`WriteMode`].
    fn write(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
        mode: WriteMode,
    ) -> Result<UpsertReport> {
        match mode {
            WriteMode::Accumulate => self.upsert(name, table, keys, values),
            WriteMode::Replace => self.overwrite(name, table, keys, values),
        }
    }
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn create_schema(&self, name: &str, schema: &SchemaSpec) -> Result<()> {
        (**self).create_schema(name, schema)
    }

    fn upsert(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport> {
        (**self).upsert(name, table, keys, values)
    }

    fn overwrite(
        &self,
        name: &str,
        table: &Table,
        keys: &[&str],
        values: &[&str],
    ) -> Result<UpsertReport> {
        (**self).overwrite(name, table, keys, values)
    }

    fn snapshot(&self, name: &str) -> Result<Table> {
        (**self).snapshot(name)
    }
}
