//! Progress reporting for transfers (bytes done, rate, ETA).
//!
//! The transfer path calls a `ProgressObserver` as chunks reach disk; it never
//! waits on the observer. `NoProgress` disables reporting and `ChannelProgress`
//! forwards events to an async consumer (the CLI printer).

use std::time::Duration;

/// Event emitted by a transfer. `bytes_done` values are absolute file
/// positions, so a dropped event only delays the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        url: String,
        filename: String,
        /// Bytes already on disk when the body started (resume offset).
        initial: u64,
        /// Offset plus the response Content-Length, when known.
        total: Option<u64>,
    },
    Advanced {
        url: String,
        bytes_done: u64,
    },
    Finished {
        url: String,
        success: bool,
    },
}

pub trait ProgressObserver: Send + Sync {
    fn started(&self, url: &str, filename: &str, initial: u64, total: Option<u64>);
    fn advanced(&self, url: &str, bytes_done: u64);
    fn finished(&self, url: &str, success: bool);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn started(&self, _url: &str, _filename: &str, _initial: u64, _total: Option<u64>) {}
    fn advanced(&self, _url: &str, _bytes_done: u64) {}
    fn finished(&self, _url: &str, _success: bool) {}
}

/// Forwards events over a bounded tokio channel. `advanced` uses `try_send`
/// and is dropped when the consumer falls behind; `started` and `finished`
/// happen once per transfer and wait for room so no file loses its start or
/// end line. Must be called from outside an async runtime (worker threads).
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: tokio::sync::mpsc::Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: tokio::sync::mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressObserver for ChannelProgress {
    fn started(&self, url: &str, filename: &str, initial: u64, total: Option<u64>) {
        let _ = self.tx.blocking_send(ProgressEvent::Started {
            url: url.to_string(),
            filename: filename.to_string(),
            initial,
            total,
        });
    }

    fn advanced(&self, url: &str, bytes_done: u64) {
        let _ = self.tx.try_send(ProgressEvent::Advanced {
            url: url.to_string(),
            bytes_done,
        });
    }

    fn finished(&self, url: &str, success: bool) {
        let _ = self.tx.blocking_send(ProgressEvent::Finished {
            url: url.to_string(),
            success,
        });
    }
}

/// Snapshot of one file's progress (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Bytes on disk now.
    pub bytes_done: u64,
    /// Bytes on disk when this run's transfer started.
    pub initial: u64,
    /// Expected final size, if the server told us.
    pub total_bytes: Option<u64>,
    /// Time since the transfer started.
    pub elapsed: Duration,
}

impl ProgressStats {
    /// Download rate for this run in bytes per second (0 if nothing elapsed).
    pub fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done.saturating_sub(self.initial) as f64 / secs
    }

    /// Estimated seconds remaining (None if size unknown or rate is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total_bytes?.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0], if the size is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes? {
            0 => Some(1.0),
            total => Some((self.bytes_done as f64 / total as f64).min(1.0)),
        }
    }
}
