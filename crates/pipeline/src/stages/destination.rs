//! Reservations per destination.

use super::columns::DESTINATION;
use crate::error::{StageError, StageResult};
use crate::kind::RESERVATION_COUNT;
use crate::stage::{Stage, StageKind};
use tally_core::Table;

/// Tallies enriched rows into `(destination, reservation_count)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DestinationCount;

impl DestinationCount {
    pub fn count(&self, enriched: &Table) -> StageResult<Table> {
        enriched
            .group_by_count(DESTINATION, RESERVATION_COUNT)
            .map_err(StageError::table(self.kind()))
    }
}

impl Stage for DestinationCount {
    fn kind(&self) -> StageKind {
        StageKind::DestinationCount
    }

    fn process(&self, table: Table) -> StageResult<Table> {
        self.count(&table)
    }
}
