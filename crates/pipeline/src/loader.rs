//! Maps merged batch output onto sink tables.

use crate::error::Result;
use crate::kind::AggregateKind;
use crate::reference::{MeanPrices, MEAN_AVG_PRICE};
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_core::{DataType, Table};
use tally_sink::{SchemaSpec, Sink, UpsertReport};

pub const MEAN_PRICE_BY_DESTINATION: &str = "mean_price_by_destination";
pub const MEAN_PRICE_BY_AIRLINE: &str = "mean_price_by_airline";

/// Writes aggregates with accumulate semantics and mean prices with replace
/// semantics.
#[derive(Clone)]
pub struct Loader {
    sink: Arc<dyn Sink>,
    suffix: String,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").field("suffix", &self.suffix).finish()
    }
}

fn mean_schema(key: &str) -> SchemaSpec {
    SchemaSpec::new()
        .key(key, DataType::String)
        .value(MEAN_AVG_PRICE, DataType::Float64)
}

impl Loader {
    pub fn new(sink: Arc<dyn Sink>, suffix: impl Into<String>) -> Self {
        Self {
            sink,
            suffix: suffix.into(),
        }
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Sink table name for `base`.
    pub fn table_name(&self, base: &str) -> String {
        format!("{}{}", base, self.suffix)
    }

    /// Creates every aggregate and mean-price table that does not exist yet.
    pub fn create_schemas(&self) -> Result<()> {
        for kind in AggregateKind::ALL {
            self.sink.create_schema(&self.table_name(kind.table_name()), &kind.schema())?;
        }
        self.sink.create_schema(
            &self.table_name(MEAN_PRICE_BY_DESTINATION),
            &mean_schema("destination"),
        )?;
        self.sink
            .create_schema(&self.table_name(MEAN_PRICE_BY_AIRLINE), &mean_schema("airline"))?;
        Ok(())
    }

    /// Upserts every merged aggregate.
    pub fn load(&self, aggregates: &BTreeMap<AggregateKind, Table>) -> Result<Vec<UpsertReport>> {
        let mut reports = Vec::with_capacity(aggregates.len());
        for (kind, table) in aggregates {
            let report = self.sink.upsert(
                &self.table_name(kind.table_name()),
                table,
                &[kind.key_column()],
                &[kind.value_column()],
            )?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Replaces the stored mean prices.
    pub fn load_means(&self, means: &MeanPrices) -> Result<Vec<UpsertReport>> {
        let by_destination = self.sink.overwrite(
            &self.table_name(MEAN_PRICE_BY_DESTINATION),
            &means.by_destination,
            &["destination"],
            &[MEAN_AVG_PRICE],
        )?;
        let by_airline = self.sink.overwrite(
            &self.table_name(MEAN_PRICE_BY_AIRLINE),
            &means.by_airline,
            &["airline"],
            &[MEAN_AVG_PRICE],
        )?;
        Ok(vec![by_destination, by_airline])
    }
}
