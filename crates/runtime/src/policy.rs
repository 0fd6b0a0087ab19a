//! Partition-count selection.

use serde::{Deserialize, Serialize};

/// Worker count used when the platform cannot report its parallelism.
pub const FALLBACK_WORKERS: usize = 4;

/// Batches with fewer rows than this run as a single partition by default.
pub const DEFAULT_SMALL_BATCH_THRESHOLD: usize = 50;

/// Returns the number of hardware threads, or [`FALLBACK_WORKERS`].
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Chooses how many partitions a batch is split into.
///
/// Small batches are not worth the fan-out and run as one partition; larger
/// batches get one partition per worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelismPolicy {
    pub max_partitions: usize,
    pub small_batch_threshold: usize,
}

impl Default for ParallelismPolicy {
    fn default() -> Self {
        Self {
            max_partitions: available_workers(),
            small_batch_threshold: DEFAULT_SMALL_BATCH_THRESHOLD,
        }
    }
}

impl ParallelismPolicy {
    /// Creates a policy capped at `max_partitions`.
    pub fn new(max_partitions: usize, small_batch_threshold: usize) -> Self {
        Self {
            max_partitions: max_partitions.max(1),
            small_batch_threshold,
        }
    }

    /// Number of partitions for a batch of `rows` rows.
    pub fn partitions_for(&self, rows: usize) -> usize {
        if rows < self.small_batch_threshold {
            1
        } else {
            self.max_partitions.max(1)
        }
    }
}
