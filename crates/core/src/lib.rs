//! Tally Core - columnar table model for the Tally aggregation engine.
//!
//! This crate provides the data types every other Tally crate builds on:
//!
//! - `Value`: a table cell (`Null`, `Boolean`, `Int64`, `Decimal`, `Float64`, `String`)
//! - `Number`: numeric view of a cell with exact integer and decimal addition
//! - `Decimal`: fixed-point number parsed from price text
//! - `Column`: an append-oriented sequence of cells
//! - `Table`: named columns of equal length with filter, group-by, concat and slice
//! - `Partition`: a row range of a table tagged with its original position
//! - `Accumulator`: key → running total map that merges by keyed addition
//! - `Error`: error type for table operations
//!
//! # Example
//!
//! ```rust
//! use tally_core::{Table, Value};
//!
//! let table = Table::from_rows(
//!     &["date", "price"],
//!     vec![
//!         vec!["2024-01-01".into(), "100".into()],
//!         vec!["2024-01-01".into(), "50".into()],
//!     ],
//! )
//! .unwrap();
//!
//! let revenue = table.group_by_sum("date", "price").unwrap();
//! assert_eq!(revenue.row_count(), 1);
//! assert_eq!(revenue.get_value("price", 0).unwrap(), &Value::Int64(150));
//! ```

#![no_std]

extern crate alloc;

mod accumulator;
mod column;
mod decimal;
mod error;
mod partition;
mod predicate;
mod table;
mod types;
mod value;

pub use accumulator::{Accumulator, NumericPolicy};
pub use column::Column;
pub use decimal::Decimal;
pub use error::{Error, Result};
pub use partition::Partition;
pub use predicate::{CompareOp, Predicate};
pub use table::{RowView, Table};
pub use types::DataType;
pub use value::{Number, Value};
