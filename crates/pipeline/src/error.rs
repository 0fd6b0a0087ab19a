//! Pipeline error types.

use crate::stage::StageKind;
use std::fmt;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for a single stage.
pub type StageResult<T> = std::result::Result<T, StageError>;

/// A stage could not process its partition.
#[derive(Debug, Error)]
pub enum StageError {
    /// A table operation inside the stage failed.
    #[error("{stage}: {source}")]
    Table {
        stage: StageKind,
        #[source]
        source: tally_core::Error,
    },

    /// The stage was handed input it cannot work with.
    #[error("{stage}: {message}")]
    Precondition { stage: StageKind, message: String },
}

impl StageError {
    /// The stage that failed.
    pub fn stage(&self) -> StageKind {
        match self {
            StageError::Table { stage, .. } | StageError::Precondition { stage, .. } => *stage,
        }
    }

    /// Adapter for `map_err` on core results.
    pub(crate) fn table(stage: StageKind) -> impl FnOnce(tally_core::Error) -> StageError {
        move |source| StageError::Table { stage, source }
    }

    pub(crate) fn precondition(stage: StageKind, message: impl Into<String>) -> Self {
        StageError::Precondition {
            stage,
            message: message.into(),
        }
    }
}

/// One partition task that produced no output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionFailure {
    pub index: usize,
    /// `None` when the task died outside any stage, e.g. a panic.
    pub stage: Option<StageKind>,
    pub message: String,
}

impl fmt::Display for PartitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(
                f,
                "partition {} failed in {}: {}",
                self.index, stage, self.message
            ),
            None => write!(f, "partition {} failed: {}", self.index, self.message),
        }
    }
}

fn join_failures(failures: &[PartitionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced to the caller of a batch run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Table(#[from] tally_core::Error),

    #[error(transparent)]
    Runtime(#[from] tally_runtime::RuntimeError),

    #[error(transparent)]
    Sink(#[from] tally_sink::SinkError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed event: {0}")]
    Event(#[from] serde_json::Error),

    /// Raised under the abort policy; nothing from the batch reached the sink.
    #[error(
        "{} of {} partitions failed: {}",
        .failures.len(),
        .partitions,
        join_failures(.failures)
    )]
    PartitionsFailed {
        partitions: usize,
        failures: Vec<PartitionFailure>,
    },
}

impl PipelineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        PipelineError::Config(message.into())
    }
}
