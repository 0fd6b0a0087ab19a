//! Joins reservations to the flight index.

use super::columns::{DESTINATION, FLIGHT_ID, FLIGHT_NUMBER, ORIGIN};
use crate::error::{StageError, StageResult};
use crate::kind::RESERVATION_COUNT;
use crate::reference::{flight_number, ReferenceData};
use crate::stage::{Stage, StageKind};
use std::sync::Arc;
use tally_core::{Column, Table};

/// Adds `flight_number`, `origin` and `destination` to every row.
///
/// The flight number is the numeric suffix of `flight_id`. Rows whose id does
/// not parse, or whose flight is not in the index, get the sentinel in the
/// columns that could not be resolved.
#[derive(Clone, Debug)]
pub struct FlightEnrich {
    reference: Arc<ReferenceData>,
    sentinel: String,
}

impl FlightEnrich {
    pub fn new(reference: Arc<ReferenceData>, sentinel: impl Into<String>) -> Self {
        Self {
            reference,
            sentinel: sentinel.into(),
        }
    }

    /// Reservations per flight of an enriched table, as
    /// `(flight_number, reservation_count)`.
    pub fn reservation_counts(&self, enriched: &Table) -> StageResult<Table> {
        enriched
            .group_by_count(FLIGHT_NUMBER, RESERVATION_COUNT)
            .map_err(StageError::table(self.kind()))
    }
}

impl Stage for FlightEnrich {
    fn kind(&self) -> StageKind {
        StageKind::FlightEnrich
    }

    fn process(&self, mut table: Table) -> StageResult<Table> {
        let ids = table.column(FLIGHT_ID).map_err(StageError::table(self.kind()))?;

        let rows = table.row_count();
        let mut numbers = Column::with_capacity(rows);
        let mut origins = Column::with_capacity(rows);
        let mut destinations = Column::with_capacity(rows);
        let mut misses = 0usize;

        for id in ids {
            let number = id.as_str().and_then(flight_number);
            let info = number.and_then(|n| self.reference.flight(n));
            numbers.push(match number {
                Some(n) => n.to_string(),
                None => self.sentinel.clone(),
            });
            match info {
                Some(info) => {
                    origins.push(info.origin.as_str());
                    destinations.push(info.destination.as_str());
                }
                None => {
                    misses += 1;
                    origins.push(self.sentinel.as_str());
                    destinations.push(self.sentinel.as_str());
                }
            }
        }
        if misses > 0 {
            log::debug!("flight enrich: {} of {} rows unmatched", misses, rows);
        }

        let kind = self.kind();
        table
            .set_column(FLIGHT_NUMBER, numbers)
            .and_then(|_| table.set_column(ORIGIN, origins))
            .and_then(|_| table.set_column(DESTINATION, destinations))
            .map_err(StageError::table(kind))?;
        Ok(table)
    }
}
