//! Batch progress reporting.
//!
//! The orchestrator reports through an injected [`PipelineObserver`]. All
//! callbacks run on the orchestrator's thread.

use crate::error::PartitionFailure;
use crate::orchestrator::BatchReport;
use std::time::Duration;
use tally_sink::UpsertReport;

/// Receives batch lifecycle events. Every method defaults to doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn batch_started(&self, _rows: usize, _partitions: usize) {}

    fn partition_finished(&self, _index: usize, _rows: usize, _elapsed: Duration) {}

    fn partition_failed(&self, _failure: &PartitionFailure) {}

    fn batch_finished(&self, _report: &BatchReport) {}

    fn sink_report(&self, _report: &UpsertReport) {}
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Forwards events to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn batch_started(&self, rows: usize, partitions: usize) {
        log::info!("batch started: {} rows in {} partitions", rows, partitions);
    }

    fn partition_finished(&self, index: usize, rows: usize, elapsed: Duration) {
        log::debug!("partition {} finished: {} rows in {:?}", index, rows, elapsed);
    }

    fn partition_failed(&self, failure: &PartitionFailure) {
        log::error!("{}", failure);
    }

    fn batch_finished(&self, report: &BatchReport) {
        log::info!(
            "batch finished: {}/{} rows kept, processing {:?}, merge {:?}, load {:?}",
            report.processed_rows,
            report.input_rows,
            report.processing,
            report.merge,
            report.load
        );
    }

    fn sink_report(&self, report: &UpsertReport) {
        if report.is_complete() {
            log::debug!(
                "{}: {} inserted, {} updated",
                report.table,
                report.inserted,
                report.updated
            );
        } else {
            log::warn!(
                "{}: {} written, {} rows rejected",
                report.table,
                report.written(),
                report.failed.len()
            );
        }
    }
}
