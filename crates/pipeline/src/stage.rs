//! The stage interface.

use crate::error::StageResult;
use crate::kind::AggregateKind;
use std::fmt;
use tally_core::Table;

/// Identifies a stage in reports and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Validate,
    StatusFilter,
    FlightEnrich,
    DestinationCount,
    DateNormalize,
    Aggregate(AggregateKind),
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Validate => f.write_str("validate"),
            StageKind::StatusFilter => f.write_str("status_filter"),
            StageKind::FlightEnrich => f.write_str("flight_enrich"),
            StageKind::DestinationCount => f.write_str("destination_count"),
            StageKind::DateNormalize => f.write_str("date_normalize"),
            StageKind::Aggregate(kind) => write!(f, "aggregate({})", kind),
        }
    }
}

/// One step of the per-partition chain.
///
/// Stages hold only configuration and read-only reference data, so one
/// instance serves every partition concurrently.
pub trait Stage: Send + Sync {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Transforms one partition's table.
    fn process(&self, table: Table) -> StageResult<Table>;
}
