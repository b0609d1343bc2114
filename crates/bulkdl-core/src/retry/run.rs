//! Retry loop: run a closure until success or the policy says stop.

use std::time::Duration;

use super::classify;
use super::error::FetchError;
use super::policy::{ErrorKind, RetryPolicy};
use super::state::AttemptState;

/// Blocks the current worker for a backoff delay. Injected so tests can record
/// the schedule instead of sleeping.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

/// Real sleeper: parks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Last error after the budget ran out (or a non-retryable error was hit).
#[derive(Debug)]
pub struct RetryError {
    pub attempts: u32,
    /// Classification of `error` that ended the loop.
    pub kind: ErrorKind,
    pub error: FetchError,
}

/// Runs `f(attempt)` until it succeeds or the retry policy says to stop.
/// `attempt` is 1-based. On retryable failure, sleeps for the backoff duration
/// then tries again. Returns the value and the number of attempts used.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut f: F,
) -> Result<(T, u32), RetryError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut state = AttemptState::start();
    loop {
        state = match state {
            AttemptState::Attempting(attempt) => match f(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(error) => {
                    let kind = classify::classify(&error);
                    match state.fail(policy, kind) {
                        AttemptState::Exhausted { attempts } => {
                            return Err(RetryError {
                                attempts,
                                kind,
                                error,
                            })
                        }
                        next => {
                            tracing::warn!(attempt, ?kind, error = %error, "attempt failed, retrying");
                            next
                        }
                    }
                }
            },
            AttemptState::Retrying { delay, .. } => {
                tracing::debug!(delay_ms = delay.as_millis() as u64, "backing off");
                sleeper.sleep(delay);
                state.resume()
            }
            AttemptState::Exhausted { .. } => unreachable!("exhausted state returns above"),
        };
    }
}
