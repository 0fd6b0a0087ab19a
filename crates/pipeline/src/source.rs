//! Batch sources.

use crate::error::Result;
use crate::event::{records_to_table, ReservationEvent};
use tally_core::Table;

/// Produces the table for one batch.
pub trait Source {
    fn fetch(&self) -> Result<Table>;
}

impl Source for Table {
    fn fetch(&self) -> Result<Table> {
        Ok(self.clone())
    }
}

impl Source for Vec<ReservationEvent> {
    fn fetch(&self) -> Result<Table> {
        records_to_table(self)
    }
}
