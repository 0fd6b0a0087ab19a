//! Revenue aggregates.

use super::columns::{FLIGHT_NUMBER, SEAT, USER_ID};
use crate::error::{StageError, StageResult};
use crate::kind::{AggregateKind, PRICE};
use crate::reference::ReferenceData;
use crate::stage::{Stage, StageKind};
use std::sync::Arc;
use tally_core::{Column, NumericPolicy, Table};

/// Sums `price` per key for one revenue [`AggregateKind`].
///
/// Country and seat-class keys are looked up in the reference data first;
/// misses are grouped under the sentinel.
#[derive(Clone, Debug)]
pub struct Aggregate {
    kind: AggregateKind,
    reference: Arc<ReferenceData>,
    sentinel: String,
    policy: NumericPolicy,
}

impl Aggregate {
    pub fn new(
        kind: AggregateKind,
        reference: Arc<ReferenceData>,
        sentinel: impl Into<String>,
        policy: NumericPolicy,
    ) -> Self {
        Self {
            kind,
            reference,
            sentinel: sentinel.into(),
            policy,
        }
    }

    pub fn aggregate_kind(&self) -> AggregateKind {
        self.kind
    }

    /// Grouped sums over `rows`, as `(key, price)`.
    pub fn aggregate(&self, rows: &Table) -> StageResult<Table> {
        let stage = self.kind();
        if !self.kind.is_revenue() {
            return Err(StageError::precondition(
                stage,
                format!("{} is not a revenue aggregate", self.kind),
            ));
        }
        let key = self.kind.key_column();
        let keyed = match self.kind {
            AggregateKind::RevenueByCountry => {
                self.with_key(rows, key, |t| self.countries(t))?
            }
            AggregateKind::RevenueBySeatClass => {
                self.with_key(rows, key, |t| self.seat_classes(t))?
            }
            _ => rows.select(&[key, PRICE]).map_err(StageError::table(stage))?,
        };
        keyed
            .group_by_sum_with(key, PRICE, self.policy)
            .map_err(StageError::table(stage))
    }

    fn with_key<F>(&self, rows: &Table, key: &str, lookup: F) -> StageResult<Table>
    where
        F: FnOnce(&Table) -> tally_core::Result<Column>,
    {
        let stage = self.kind();
        let keys = lookup(rows).map_err(StageError::table(stage))?;
        let prices = rows.column(PRICE).map_err(StageError::table(stage))?.clone();
        Table::from_columns(vec![(key, keys), (PRICE, prices)]).map_err(StageError::table(stage))
    }

    fn countries(&self, rows: &Table) -> tally_core::Result<Column> {
        Ok(rows
            .column(USER_ID)?
            .iter()
            .map(|id| {
                self.reference
                    .country(&id.to_string())
                    .unwrap_or(&self.sentinel)
                    .to_string()
            })
            .collect())
    }

    fn seat_classes(&self, rows: &Table) -> tally_core::Result<Column> {
        let flights = rows.column(FLIGHT_NUMBER)?;
        let seats = rows.column(SEAT)?;
        Ok(flights
            .iter()
            .zip(seats.iter())
            .map(|(flight, seat)| {
                self.reference
                    .seat_class(&flight.to_string(), &seat.to_string())
                    .unwrap_or(&self.sentinel)
                    .to_string()
            })
            .collect())
    }
}

impl Stage for Aggregate {
    fn kind(&self) -> StageKind {
        StageKind::Aggregate(self.kind)
    }

    fn process(&self, table: Table) -> StageResult<Table> {
        self.aggregate(&table)
    }
}
