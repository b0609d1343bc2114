//! One batch run: filter already-completed URLs, dispatch the rest through
//! the worker pool, and tally the outcomes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::pool::WorkerPool;
use crate::ledger::Ledger;
use crate::transfer::TransferContext;
use crate::url_model::derive_filename;

/// Outcome counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// URLs in the input list (duplicates counted).
    pub total: usize,
    /// Skipped because the ledger already had them as completed.
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `(url, error)` for every failed transfer, in completion order.
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    pub fn dispatched(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Downloads every URL in `urls` not yet completed according to `ledger`.
///
/// Blocks until all dispatched transfers have reached a terminal outcome. Per-URL
/// failures are counted, never propagated; a re-run over the same list and
/// ledger does no work for URLs that already completed.
pub fn run_batch(
    urls: &[String],
    dest_dir: &Path,
    ledger: Arc<Ledger>,
    ctx: Arc<TransferContext>,
    max_workers: usize,
) -> RunSummary {
    let pending = ledger.pending(urls);
    let mut summary = RunSummary {
        total: urls.len(),
        skipped: urls.len() - pending.len(),
        ..RunSummary::default()
    };
    if summary.skipped > 0 {
        tracing::info!(
            skipped = summary.skipped,
            "skipping URLs already completed in {}",
            ledger.path().display()
        );
    }
    if pending.is_empty() {
        tracing::info!("nothing to download");
        return summary;
    }
    warn_on_name_collisions(&pending);

    let pool = WorkerPool::new(max_workers);
    tracing::info!(
        pending = pending.len(),
        workers = pool.max_workers().min(pending.len()),
        "starting downloads into {}",
        dest_dir.display()
    );

    for report in pool.run_all(pending, dest_dir, ledger, ctx) {
        match report.error_description() {
            None => summary.succeeded += 1,
            Some(err) => {
                summary.failed += 1;
                summary.failures.push((report.url, err));
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch finished"
    );
    summary
}

/// Distinct URLs that land on the same filename overwrite each other; the
/// pool serializes them but cannot keep both files.
fn warn_on_name_collisions(urls: &[String]) {
    let mut by_name: HashMap<String, Vec<&str>> = HashMap::new();
    for url in urls {
        let entry = by_name.entry(derive_filename(url)).or_default();
        if !entry.contains(&url.as_str()) {
            entry.push(url);
        }
    }
    for (name, owners) in by_name {
        if owners.len() > 1 {
            tracing::warn!(
                file = %name,
                "{} different URLs map to the same file; the last one to finish wins: {}",
                owners.len(),
                owners.join(", ")
            );
        }
    }
}
