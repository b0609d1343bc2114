//! Per-transfer attempt state machine.
//!
//! `Attempting(n) -> { success, Retrying(n + 1), Exhausted }`. Success is the
//! caller returning its value; this type only models the failure edges so the
//! budget and backoff schedule can be tested without any I/O.

use std::time::Duration;

use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Attempt `n` (1-based) is about to run.
    Attempting(u32),
    /// Waiting `delay` before running attempt `next`.
    Retrying { next: u32, delay: Duration },
    /// No further attempts; `attempts` were made.
    Exhausted { attempts: u32 },
}

impl AttemptState {
    pub fn start() -> Self {
        AttemptState::Attempting(1)
    }

    /// Transition after the current attempt failed with `kind`.
    pub fn fail(self, policy: &RetryPolicy, kind: ErrorKind) -> Self {
        match self {
            AttemptState::Attempting(n) => match policy.decide(n, kind) {
                RetryDecision::RetryAfter(delay) => AttemptState::Retrying { next: n + 1, delay },
                RetryDecision::NoRetry => AttemptState::Exhausted { attempts: n },
            },
            other => other,
        }
    }

    /// Transition once the backoff has elapsed.
    pub fn resume(self) -> Self {
        match self {
            AttemptState::Retrying { next, .. } => AttemptState::Attempting(next),
            other => other,
        }
    }
}
