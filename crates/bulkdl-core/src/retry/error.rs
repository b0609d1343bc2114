//! Error type for a single transfer attempt.

use thiserror::Error;

/// Error returned by one HTTP attempt (curl failure, HTTP error, short body, or storage failure).
/// Kept separate from the terminal transfer error so we can classify and decide retries first.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final HTTP response had an error status (>= 400).
    #[error("HTTP {0}")]
    Http(u32),
    /// Body ended before `Content-Length` bytes arrived. Bytes already written are kept.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Server rejected the resume offset and the local file does not match the remote size.
    /// The partial file has been discarded so the next attempt starts from zero.
    #[error("range not satisfiable at offset {offset} (remote size {})", fmt_total(.total))]
    RangeNotSatisfiable { offset: u64, total: Option<u64> },
    /// Disk/storage failure (open, write, truncate). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}

fn fmt_total(total: &Option<u64>) -> String {
    total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl FetchError {
    /// True for failures on our side of the wire.
    pub fn is_local(&self) -> bool {
        matches!(self, FetchError::Storage(_))
    }
}
