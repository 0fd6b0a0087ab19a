//! Partition, process, merge, load.
//!
//! A batch is split into contiguous partitions. Every partition runs the whole
//! [`StageChain`] on a pool worker and publishes `(index, table)` pairs on one
//! bounded channel per output. After all tasks resolve, the orchestrator
//! drains each channel, concatenates row output in index order, folds
//! aggregate partials by key, and hands the result to the sink.

use crate::chain::{ChainOutput, StageChain};
use crate::config::{FailurePolicy, PipelineConfig, TotalsPolicy};
use crate::error::{PartitionFailure, PipelineError, Result, StageResult};
use crate::kind::AggregateKind;
use crate::loader::Loader;
use crate::observer::{LogObserver, PipelineObserver};
use crate::reference::{MeanPrices, ReferenceData};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tally_core::{Number, NumericPolicy, Table, Value};
use tally_runtime::{BoundedChannel, WorkerPool};
use tally_sink::{Sink, UpsertReport};

/// Outcome of one batch run.
#[derive(Clone, Debug)]
pub struct BatchReport {
    pub first_run: bool,
    pub input_rows: usize,
    /// Rows that survived validation and the status filter.
    pub processed_rows: usize,
    pub partitions: usize,
    pub processing: Duration,
    pub merge: Duration,
    pub load: Duration,
    /// Merged row output in original order.
    pub rows: Table,
    /// Merged aggregates, one row per key.
    pub aggregates: BTreeMap<AggregateKind, Table>,
    /// Written on the first run only.
    pub mean_prices: Option<MeanPrices>,
    /// Revenue of this batch.
    pub revenue: Number,
    pub sink_reports: Vec<UpsertReport>,
    /// Non-empty only under [`FailurePolicy::CommitSurvivors`].
    pub failures: Vec<PartitionFailure>,
}

impl BatchReport {
    pub fn aggregate(&self, kind: AggregateKind) -> Option<&Table> {
        self.aggregates.get(&kind)
    }

    /// Rows the sink refused across all tables.
    pub fn rejected_rows(&self) -> usize {
        self.sink_reports.iter().map(|r| r.failed.len()).sum()
    }

    /// True if every partition succeeded and every row reached the sink.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.rejected_rows() == 0
    }
}

type Indexed = (usize, Table);

/// One channel per output; each holds at most one entry per partition.
struct Channels {
    rows: BoundedChannel<Indexed>,
    aggregates: Vec<(AggregateKind, BoundedChannel<Indexed>)>,
}

impl Channels {
    fn new(partitions: usize) -> Self {
        Self {
            rows: BoundedChannel::new(partitions),
            aggregates: AggregateKind::ALL
                .iter()
                .map(|kind| (*kind, BoundedChannel::new(partitions)))
                .collect(),
        }
    }

    fn publish(&self, index: usize, output: ChainOutput) {
        self.rows.put((index, output.rows));
        for (kind, table) in output.aggregates {
            if let Some((_, channel)) = self.aggregates.iter().find(|(k, _)| *k == kind) {
                channel.put((index, table));
            }
        }
    }
}

struct PartitionStats {
    index: usize,
    rows: usize,
    elapsed: Duration,
}

pub struct Orchestrator {
    config: PipelineConfig,
    pool: WorkerPool,
    chain: Arc<StageChain>,
    reference: Arc<ReferenceData>,
    loader: Loader,
    observer: Arc<dyn PipelineObserver>,
    /// Written once per batch after the barrier, by the calling thread only.
    /// The lock only gives `&self` access for [`TotalsPolicy::Cumulative`].
    revenue: Mutex<Number>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish()
    }
}

impl Orchestrator {
    /// Validates `config` and starts the worker pool.
    pub fn new(
        config: PipelineConfig,
        reference: ReferenceData,
        sink: Arc<dyn Sink>,
    ) -> Result<Self> {
        config.validate()?;
        let reference = Arc::new(reference);
        let chain = Arc::new(StageChain::new(&config, Arc::clone(&reference)));
        let pool = WorkerPool::new(config.workers)?;
        let loader = Loader::new(sink, config.table_suffix.as_str());
        Ok(Self {
            config,
            pool,
            chain,
            reference,
            loader,
            observer: Arc::new(LogObserver),
            revenue: Mutex::new(Number::ZERO),
        })
    }

    /// Replaces the default [`LogObserver`].
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Revenue of the last batch, or of every batch so far under
    /// [`TotalsPolicy::Cumulative`].
    pub fn total_revenue(&self) -> Number {
        *self.revenue.lock()
    }

    /// Processes one batch and persists its aggregates.
    ///
    /// `first_run` creates the sink tables and writes the mean-price
    /// reference tables. Missing input columns fail before any partition is
    /// scheduled.
    pub fn run_batch(&self, table: Table, first_run: bool) -> Result<BatchReport> {
        table.require_columns(&self.chain.input_columns()[..])?;

        let mean_prices = if first_run {
            self.loader.create_schemas()?;
            Some(self.reference.mean_prices(self.config.numeric_policy)?)
        } else {
            None
        };

        let input_rows = table.row_count();
        let partitions = table.partition(self.config.partitions_for(input_rows))?;
        let count = partitions.len();
        self.observer.batch_started(input_rows, count);

        let started = Instant::now();
        let channels = Arc::new(Channels::new(count));
        let handles = partitions
            .into_iter()
            .map(|partition| {
                let chain = Arc::clone(&self.chain);
                let channels = Arc::clone(&channels);
                let index = partition.index;
                let handle = self.pool.submit(move || -> StageResult<PartitionStats> {
                    let begun = Instant::now();
                    let output = chain.run(partition.table)?;
                    let rows = output.rows.row_count();
                    channels.publish(index, output);
                    Ok(PartitionStats {
                        index,
                        rows,
                        elapsed: begun.elapsed(),
                    })
                })?;
                Ok((index, handle))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut failures = Vec::new();
        for (index, handle) in handles {
            let failure = match handle.wait() {
                Ok(Ok(stats)) => {
                    self.observer
                        .partition_finished(stats.index, stats.rows, stats.elapsed);
                    continue;
                }
                Ok(Err(err)) => PartitionFailure {
                    index,
                    stage: Some(err.stage()),
                    message: err.to_string(),
                },
                Err(err) => PartitionFailure {
                    index,
                    stage: None,
                    message: err.to_string(),
                },
            };
            self.observer.partition_failed(&failure);
            failures.push(failure);
        }
        let processing = started.elapsed();

        if !failures.is_empty() && self.config.on_failure == FailurePolicy::Abort {
            return Err(PipelineError::PartitionsFailed {
                partitions: count,
                failures,
            });
        }

        let started = Instant::now();
        let survivors = count - failures.len();
        let rows = merge_rows(channels.rows.take(survivors))?;
        let mut aggregates = BTreeMap::new();
        for (kind, channel) in &channels.aggregates {
            let parts = channel.take(survivors);
            let merged = merge_aggregate(*kind, parts, self.config.numeric_policy)?;
            aggregates.insert(*kind, merged);
        }
        let revenue = column_total(&aggregates, AggregateKind::RevenueByDay);
        {
            let mut total = self.revenue.lock();
            *total = match self.config.totals_policy {
                TotalsPolicy::PerBatch => revenue,
                TotalsPolicy::Cumulative => *total + revenue,
            };
        }
        let merge = started.elapsed();

        let started = Instant::now();
        let mut sink_reports = self.loader.load(&aggregates)?;
        if let Some(means) = &mean_prices {
            sink_reports.extend(self.loader.load_means(means)?);
        }
        for report in &sink_reports {
            self.observer.sink_report(report);
        }
        let load = started.elapsed();

        let report = BatchReport {
            first_run,
            input_rows,
            processed_rows: rows.row_count(),
            partitions: count,
            processing,
            merge,
            load,
            rows,
            aggregates,
            mean_prices,
            revenue,
            sink_reports,
            failures,
        };
        self.observer.batch_finished(&report);
        Ok(report)
    }
}

/// Concatenates row output by ascending partition index.
fn merge_rows(mut parts: Vec<Indexed>) -> Result<Table> {
    parts.sort_by_key(|(index, _)| *index);
    let mut parts = parts.into_iter().map(|(_, table)| table);
    let Some(mut merged) = parts.next() else {
        return Ok(Table::new());
    };
    for part in parts {
        merged = merged.concat(&part)?;
    }
    Ok(merged)
}

/// Folds per-partition partials into one row per key, in partition order.
fn merge_aggregate(
    kind: AggregateKind,
    mut parts: Vec<Indexed>,
    policy: NumericPolicy,
) -> Result<Table> {
    parts.sort_by_key(|(index, _)| *index);
    let (key, value) = (kind.key_column(), kind.value_column());
    let mut combined = Table::with_columns(&[key, value])?;
    for (_, part) in parts {
        combined = combined.concat(&part)?;
    }
    Ok(combined.group_by_sum_with(key, value, policy)?)
}

fn column_total(
    aggregates: &BTreeMap<AggregateKind, Table>,
    kind: AggregateKind,
) -> Number {
    aggregates
        .get(&kind)
        .and_then(|t| t.column(kind.value_column()).ok())
        .map(|column| {
            column
                .iter()
                .filter_map(Value::to_number)
                .fold(Number::ZERO, |acc, n| acc + n)
        })
        .unwrap_or(Number::ZERO)
}
