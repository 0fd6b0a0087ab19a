//! Error types for the worker pool.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors raised by [`WorkerPool`](crate::WorkerPool) and its task handles.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// `submit` was called after shutdown began.
    #[error("worker pool is closed")]
    PoolClosed,

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread {index}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// The task panicked; the message is the panic payload when it was a string.
    #[error("task panicked: {message}")]
    TaskPanicked { message: String },

    /// The pool dropped the task before running it.
    #[error("task was dropped before completion")]
    TaskDropped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(RuntimeError::PoolClosed.to_string(), "worker pool is closed");
        let err = RuntimeError::TaskPanicked {
            message: "boom".into(),
        };
        assert!(err.to_string().contains("boom"));
    }
}
