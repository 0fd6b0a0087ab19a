//! Pipeline configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```
//! use tally_pipeline::PipelineConfig;
//!
//! let json = r#"{ "workers": 2, "target_status": "pending" }"#;
//! let config = PipelineConfig::from_json_str(json).unwrap();
//! assert_eq!(config.workers, 2);
//! assert_eq!(config.date_prefix_len, 10);
//! ```

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use tally_core::NumericPolicy;
use tally_runtime::{available_workers, ParallelismPolicy, DEFAULT_SMALL_BATCH_THRESHOLD};

/// Marker the upstream generator writes into fields it never received.
pub const DEFAULT_MISSING_MARKER: &str = "DADO_NAO_RECEBIDO";

/// Value used for lookups that found nothing.
pub const DEFAULT_UNKNOWN_SENTINEL: &str = "UNKNOWN";

/// What happens to a batch when some partitions fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Write nothing and return every failure as an error.
    #[default]
    Abort,
    /// Merge and persist the partitions that succeeded; list failures in the report.
    CommitSurvivors,
}

/// Scope of [`Orchestrator::total_revenue`](crate::Orchestrator::total_revenue).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsPolicy {
    /// Reset at the start of every batch.
    #[default]
    PerBatch,
    /// Keep adding across batches for the orchestrator's lifetime.
    Cumulative,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker threads in the pool.
    pub workers: usize,
    /// Fixed partition count; `None` lets the parallelism policy decide.
    pub partitions: Option<usize>,
    /// Batches smaller than this run as one partition.
    pub small_batch_threshold: usize,
    pub target_status: String,
    /// Rows with any of these fields empty or marked missing are dropped.
    pub required_fields: Vec<String>,
    pub missing_markers: Vec<String>,
    pub unknown_sentinel: String,
    pub date_prefix_len: usize,
    pub numeric_policy: NumericPolicy,
    pub totals_policy: TotalsPolicy,
    pub on_failure: FailurePolicy,
    /// Appended to every sink table name.
    pub table_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            partitions: None,
            small_batch_threshold: DEFAULT_SMALL_BATCH_THRESHOLD,
            target_status: "confirmed".into(),
            required_fields: vec!["flight_id".into(), "user_id".into()],
            missing_markers: vec![DEFAULT_MISSING_MARKER.into()],
            unknown_sentinel: DEFAULT_UNKNOWN_SENTINEL.into(),
            date_prefix_len: 10,
            numeric_policy: NumericPolicy::Strict,
            totals_policy: TotalsPolicy::PerBatch,
            on_failure: FailurePolicy::Abort,
            table_suffix: String::new(),
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON config and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| PipelineError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn with_totals_policy(mut self, policy: TotalsPolicy) -> Self {
        self.totals_policy = policy;
        self
    }

    pub fn with_table_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.table_suffix = suffix.into();
        self
    }

    /// Rejects settings no batch could run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PipelineError::config("workers must be at least 1"));
        }
        if self.partitions == Some(0) {
            return Err(PipelineError::config("partitions must be at least 1"));
        }
        if self.date_prefix_len == 0 {
            return Err(PipelineError::config("date_prefix_len must be at least 1"));
        }
        if self.target_status.trim().is_empty() {
            return Err(PipelineError::config("target_status must not be empty"));
        }
        Ok(())
    }

    /// Partition-count policy derived from this config.
    pub fn parallelism(&self) -> ParallelismPolicy {
        ParallelismPolicy::new(self.workers, self.small_batch_threshold)
    }

    /// Number of partitions for a batch of `rows` rows.
    pub fn partitions_for(&self, rows: usize) -> usize {
        match self.partitions {
            Some(n) => n,
            None => self.parallelism().partitions_for(rows),
        }
    }
}
