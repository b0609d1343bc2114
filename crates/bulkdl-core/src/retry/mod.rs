//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures, local storage errors), the per-transfer attempt state
//! machine, and exponential backoff decisions so that the transfer layer and
//! its tests share one schedule.

mod classify;
mod error;
mod policy;
mod run;
mod state;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryError, Sleeper, ThreadSleeper};
pub use state::AttemptState;
