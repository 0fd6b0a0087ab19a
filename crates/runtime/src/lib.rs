//! Tally Runtime - thread-based concurrency primitives.
//!
//! - `BoundedChannel`: fixed-capacity FIFO with blocking `put`/`get`
//! - `WorkerPool`: fixed set of OS threads consuming a shared task queue
//! - `TaskHandle`: blocking handle to one submitted task's result
//! - `ParallelismPolicy`: picks a partition count for a batch
//!
//! Everything here blocks on a mutex and condition variable; nothing is async.

mod channel;
mod error;
mod policy;
mod pool;

pub use channel::BoundedChannel;
pub use error::{Result, RuntimeError};
pub use policy::{
    available_workers, ParallelismPolicy, DEFAULT_SMALL_BATCH_THRESHOLD, FALLBACK_WORKERS,
};
pub use pool::{TaskHandle, WorkerPool};
