//! Batch scheduler.
//!
//! Runs the pending URLs of a list through a fixed-size pool of worker
//! threads: ledger filter → worker pool → transfer (per URL) → ledger outcome.

mod batch;
mod path_lock;
mod pool;

pub use batch::{run_batch, RunSummary};
pub use path_lock::PathLocks;
pub use pool::{Dispatch, WorkerPool, DEFAULT_MAX_WORKERS};
