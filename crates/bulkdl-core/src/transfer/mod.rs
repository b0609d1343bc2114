//! Resumable transfer of one URL.
//!
//! Derives the target filename, resumes from any partial file with a
//! `Range: bytes=<offset>-` request, retries transient failures with
//! exponential backoff (re-probing the on-disk size before every attempt),
//! and records exactly one terminal outcome in the ledger before returning.

mod fetch;
mod headers;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::ledger::{Ledger, Status};
use crate::progress::{NoProgress, ProgressObserver};
use crate::retry::{run_with_retry, FetchError, RetryPolicy, Sleeper, ThreadSleeper};
use crate::storage;
use crate::url_model::derive_filename;

use fetch::{fetch_once, Target};

/// Per-request knobs shared by every transfer in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Connect timeout, and how long the body may stall before the attempt fails.
    pub timeout: Duration,
    /// Receive buffer size; upper bound on each chunk written to disk.
    pub chunk_size: usize,
    pub retry: RetryPolicy,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            chunk_size: 8192,
            retry: RetryPolicy::default(),
        }
    }
}

/// Options plus the injectable collaborators (backoff clock, progress sink).
#[derive(Clone)]
pub struct TransferContext {
    pub options: TransferOptions,
    pub sleeper: Arc<dyn Sleeper>,
    pub progress: Arc<dyn ProgressObserver>,
}

impl TransferContext {
    pub fn new(options: TransferOptions) -> Self {
        Self {
            options,
            sleeper: Arc::new(ThreadSleeper),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }
}

impl Default for TransferContext {
    fn default() -> Self {
        Self::new(TransferOptions::default())
    }
}

/// Terminal failure of one URL.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("download failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: FetchError,
    },
    #[error("local error: {0}")]
    Local(#[source] std::io::Error),
    #[error("target {} is the progress ledger's own file; not downloading over it", .0.display())]
    LedgerCollision(PathBuf),
    #[error("transfer panicked: {0}")]
    Panicked(String),
}

/// What a successful transfer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    /// Final file length.
    pub bytes_on_disk: u64,
    /// Bytes that were already on disk before the first attempt.
    pub resumed_from: u64,
    pub attempts: u32,
}

/// Terminal outcome of one URL, as reported to the dispatcher.
#[derive(Debug)]
pub struct TransferReport {
    pub url: String,
    pub filename: String,
    pub result: Result<TransferStats, TransferError>,
}

impl TransferReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn status(&self) -> Status {
        if self.is_success() {
            Status::Completed
        } else {
            Status::Failed
        }
    }

    /// Human-readable error, `None` on success.
    pub fn error_description(&self) -> Option<String> {
        self.result.as_ref().err().map(|e| e.to_string())
    }
}

/// Path a URL is downloaded to inside `dest_dir`.
pub fn target_path(url: &str, dest_dir: &Path) -> PathBuf {
    dest_dir.join(derive_filename(url))
}

/// Downloads `url` into `dest_dir` and records the outcome in `ledger`.
///
/// `dest_dir` must already exist. Never panics on I/O or network failure: every
/// error ends up in the report and as a `failed` ledger entry.
pub fn transfer(url: &str, dest_dir: &Path, ledger: &Ledger, ctx: &TransferContext) -> TransferReport {
    let filename = derive_filename(url);
    let span = tracing::info_span!("transfer", file = %filename);
    let _enter = span.enter();

    let path = dest_dir.join(&filename);
    let result = download(url, &path, &filename, ledger, ctx);
    finish(url, filename, result, ledger, ctx)
}

/// Records a terminal outcome (ledger, log, progress) and builds the report.
pub(crate) fn finish(
    url: &str,
    filename: String,
    result: Result<TransferStats, TransferError>,
    ledger: &Ledger,
    ctx: &TransferContext,
) -> TransferReport {
    let report = TransferReport {
        url: url.to_string(),
        filename,
        result,
    };
    if let Err(e) = ledger.record_outcome(url, report.status()) {
        tracing::error!(url, "could not persist ledger: {:#}", e);
    }
    match &report.result {
        Ok(stats) => tracing::info!(
            url,
            bytes = stats.bytes_on_disk,
            resumed_from = stats.resumed_from,
            attempts = stats.attempts,
            "downloaded {}",
            report.filename
        ),
        Err(e) => tracing::error!(url, "failed to download {}: {}", report.filename, e),
    }
    ctx.progress.finished(url, report.is_success());
    report
}

fn download(
    url: &str,
    path: &Path,
    filename: &str,
    ledger: &Ledger,
    ctx: &TransferContext,
) -> Result<TransferStats, TransferError> {
    if ledger.owns_path(path) {
        return Err(TransferError::LedgerCollision(path.to_path_buf()));
    }
    // A URL already marked completed (e.g. listed twice) is fetched again from scratch;
    // anything else treats existing bytes as a valid prefix of the resource.
    let resumable = ledger.status(url) != Some(Status::Completed);
    let resumed_from = if resumable {
        storage::existing_len(path).map_err(TransferError::Local)?
    } else {
        0
    };

    let target = Target {
        url,
        path,
        filename,
        progress: ctx.progress.as_ref(),
    };
    let outcome = run_with_retry(&ctx.options.retry, ctx.sleeper.as_ref(), |attempt| {
        let offset = if resumable || attempt > 1 {
            storage::existing_len(path).map_err(FetchError::Storage)?
        } else {
            0
        };
        if offset > 0 {
            tracing::debug!(attempt, offset, "requesting bytes={}-", offset);
        } else {
            tracing::debug!(attempt, "requesting full body");
        }
        fetch_once(&target, offset, &ctx.options)
    });

    match outcome {
        Ok((bytes_on_disk, attempts)) => Ok(TransferStats {
            bytes_on_disk,
            resumed_from,
            attempts,
        }),
        Err(e) => {
            tracing::debug!(kind = ?e.kind, attempts = e.attempts, "giving up");
            Err(match e.error {
                FetchError::Storage(io) => TransferError::Local(io),
                last => TransferError::RetriesExhausted {
                    attempts: e.attempts,
                    last,
                },
            })
        }
    }
}
