//! Fixed-size worker pool for transfers.
//!
//! `max_workers` OS threads pull URLs from a shared FIFO queue and send each
//! terminal report over a channel as soon as it exists. The caller drains a
//! `Dispatch`, which yields reports in completion order, not submission order.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::path_lock::PathLocks;
use crate::ledger::Ledger;
use crate::transfer::{self, TransferContext, TransferError, TransferReport};
use crate::url_model::derive_filename;

/// Default number of concurrent transfers.
pub const DEFAULT_MAX_WORKERS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    max_workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Submits one transfer per URL (duplicates included) and returns the
    /// lazy, unordered stream of their reports. At most `max_workers` run at once.
    pub fn run_all(
        &self,
        urls: Vec<String>,
        dest_dir: &Path,
        ledger: Arc<Ledger>,
        ctx: Arc<TransferContext>,
    ) -> Dispatch {
        let count = urls.len();
        let work: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(urls.into_iter().collect()));
        let path_locks = Arc::new(PathLocks::new());
        let (tx, rx) = mpsc::channel();
        let num_workers = self.max_workers.min(count);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let tx = tx.clone();
            let dest_dir = dest_dir.to_path_buf();
            let ledger = Arc::clone(&ledger);
            let ctx = Arc::clone(&ctx);
            let path_locks = Arc::clone(&path_locks);
            handles.push(std::thread::spawn(move || loop {
                let url = match next_url(&work) {
                    Some(u) => u,
                    None => break,
                };
                let report = run_isolated(&url, &dest_dir, &ledger, &ctx, &path_locks);
                if tx.send(report).is_err() {
                    // Receiver gone; keep draining so every URL still gets a ledger entry.
                    continue;
                }
            }));
        }
        drop(tx);
        Dispatch {
            rx,
            handles,
            remaining: count,
        }
    }
}

fn next_url(work: &Mutex<VecDeque<String>>) -> Option<String> {
    work.lock().unwrap_or_else(|e| e.into_inner()).pop_front()
}

/// Runs one transfer with exclusive use of its target path. A panic in the
/// transfer path is turned into a failed report instead of killing the worker.
fn run_isolated(
    url: &str,
    dest_dir: &Path,
    ledger: &Ledger,
    ctx: &TransferContext,
    path_locks: &PathLocks,
) -> TransferReport {
    let lock = path_locks.lock_for(&transfer::target_path(url, dest_dir));
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    match panic::catch_unwind(AssertUnwindSafe(|| transfer::transfer(url, dest_dir, ledger, ctx))) {
        Ok(report) => report,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            transfer::finish(
                url,
                derive_filename(url),
                Err(TransferError::Panicked(msg)),
                ledger,
                ctx,
            )
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle over in-flight transfers. Iterating yields each report once, as it
/// completes; dropping the handle waits for every submitted transfer to finish.
pub struct Dispatch {
    rx: mpsc::Receiver<TransferReport>,
    handles: Vec<JoinHandle<()>>,
    remaining: usize,
}

impl Dispatch {
    /// Reports not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn join_workers(&mut self) {
        for h in self.handles.drain(..) {
            if h.join().is_err() {
                tracing::error!("download worker thread panicked");
            }
        }
    }
}

impl Iterator for Dispatch {
    type Item = TransferReport;

    fn next(&mut self) -> Option<TransferReport> {
        if self.remaining == 0 {
            self.join_workers();
            return None;
        }
        match self.rx.recv() {
            Ok(report) => {
                self.remaining -= 1;
                Some(report)
            }
            Err(_) => {
                // All workers exited early; nothing more will arrive.
                self.remaining = 0;
                self.join_workers();
                None
            }
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        self.join_workers();
    }
}
