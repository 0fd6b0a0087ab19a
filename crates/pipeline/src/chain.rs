//! The fixed per-partition stage chain.

use crate::config::PipelineConfig;
use crate::error::StageResult;
use crate::kind::{AggregateKind, PRICE};
use crate::reference::ReferenceData;
use crate::stage::Stage;
use crate::stages::columns::{
    FLIGHT_ID, PAYMENT_METHOD, RESERVATION_TIME, SEAT, STATUS, USER_ID,
};
use crate::stages::{
    Aggregate, DateNormalize, DestinationCount, FlightEnrich, StatusFilter, Validate,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_core::Table;

/// Everything one partition contributes to a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainOutput {
    /// Validated, filtered, enriched and date-normalized rows.
    pub rows: Table,
    /// One partial table per [`AggregateKind`].
    pub aggregates: BTreeMap<AggregateKind, Table>,
}

/// Runs validate, status filter, flight enrich, destination count, date
/// normalize and the revenue aggregates, in that order.
#[derive(Debug)]
pub struct StageChain {
    validate: Validate,
    status: StatusFilter,
    enrich: FlightEnrich,
    destinations: DestinationCount,
    dates: DateNormalize,
    revenue: Vec<Aggregate>,
}

impl StageChain {
    pub fn new(config: &PipelineConfig, reference: Arc<ReferenceData>) -> Self {
        let revenue = AggregateKind::REVENUE
            .iter()
            .map(|kind| {
                Aggregate::new(
                    *kind,
                    Arc::clone(&reference),
                    config.unknown_sentinel.as_str(),
                    config.numeric_policy,
                )
            })
            .collect();
        Self {
            validate: Validate::from_config(config),
            status: StatusFilter::new(config.target_status.as_str()),
            enrich: FlightEnrich::new(reference, config.unknown_sentinel.as_str()),
            destinations: DestinationCount,
            dates: DateNormalize::new(config.date_prefix_len),
            revenue,
        }
    }

    /// Columns an input table must carry.
    pub fn input_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            FLIGHT_ID,
            SEAT,
            USER_ID,
            STATUS,
            PAYMENT_METHOD,
            RESERVATION_TIME,
            PRICE,
        ];
        for field in self.validate.required_fields() {
            if !columns.contains(&field.as_str()) {
                columns.push(field.as_str());
            }
        }
        columns
    }

    /// Runs every stage over one partition.
    ///
    /// All outputs are computed before any is returned, so a failing stage
    /// leaves the partition with no contribution at all.
    pub fn run(&self, table: Table) -> StageResult<ChainOutput> {
        let rows = self.validate.process(table)?;
        let rows = self.status.process(rows)?;
        let rows = self.enrich.process(rows)?;

        let mut aggregates = BTreeMap::new();
        aggregates.insert(AggregateKind::FlightPopularity, self.enrich.reservation_counts(&rows)?);
        aggregates.insert(AggregateKind::DestinationPopularity, self.destinations.count(&rows)?);

        let rows = self.dates.process(rows)?;
        for stage in &self.revenue {
            aggregates.insert(stage.aggregate_kind(), stage.aggregate(&rows)?);
        }

        Ok(ChainOutput { rows, aggregates })
    }
}
