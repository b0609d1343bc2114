//! Persistent per-URL progress ledger.
//!
//! Maps each URL to its terminal status (`completed` / `failed`). Loaded once
//! per run and rewritten in full after every outcome. All reads, merges and
//! writes go through one mutex, so concurrent workers never lose each other's
//! entries or interleave partial writes.

mod persist;
mod types;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub use types::{LedgerCounts, Status};

use persist::{Entries, ReadError};

/// Default ledger filename inside the download directory.
pub const DEFAULT_LEDGER_FILE: &str = "download_progress.json";

/// Handle to the ledger file and its in-memory mapping.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl Ledger {
    /// Default ledger location for a download directory.
    pub fn default_path(download_dir: &Path) -> PathBuf {
        download_dir.join(DEFAULT_LEDGER_FILE)
    }

    /// Load the ledger at `path`. Never fails: a missing file is an empty ledger,
    /// and an unreadable or malformed one is logged, moved aside to
    /// `<path>.corrupt` when it could be read, and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match persist::read_entries(&path) {
            Ok(Some(entries)) => {
                tracing::debug!(entries = entries.len(), "loaded ledger from {}", path.display());
                entries
            }
            Ok(None) => Entries::new(),
            Err(e @ ReadError::Parse { .. }) => {
                tracing::warn!("ignoring corrupt ledger ({}); starting with no prior progress", e);
                match persist::quarantine(&path) {
                    Ok(moved) => tracing::warn!("corrupt ledger moved to {}", moved.display()),
                    Err(qe) => tracing::warn!("could not move corrupt ledger aside: {:#}", qe),
                }
                Entries::new()
            }
            Err(e @ ReadError::Io { .. }) => {
                tracing::warn!("cannot read ledger ({}); starting with no prior progress", e);
                Entries::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Read-only open for inspection. `Ok(None)` when the file does not exist;
    /// an unreadable or malformed file is an error and is left where it is.
    pub fn inspect(path: impl Into<PathBuf>) -> Result<Option<Self>> {
        let path = path.into();
        match persist::read_entries(&path) {
            Ok(Some(entries)) => Ok(Some(Self {
                path,
                entries: Mutex::new(entries),
            })),
            Ok(None) => Ok(None),
            Err(e @ ReadError::Parse { .. }) => Err(anyhow::anyhow!("corrupt ledger: {}", e)),
            Err(e) => Err(anyhow::Error::new(e).context("cannot read ledger")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether writing to `path` would clobber the ledger file or one of the
    /// `.tmp` / `.corrupt` siblings it writes next to itself.
    pub fn owns_path(&self, path: &Path) -> bool {
        [
            self.path.clone(),
            persist::sibling(&self.path, "tmp"),
            persist::sibling(&self.path, "corrupt"),
        ]
        .iter()
        .any(|own| same_location(own, path))
    }

    /// Recorded status for `url` (exact string match).
    pub fn status(&self, url: &str) -> Option<Status> {
        self.lock().get(url).copied()
    }

    /// URLs still to do: absent from the ledger or `Failed`. Order and
    /// duplicates of the input are preserved.
    pub fn pending(&self, urls: &[String]) -> Vec<String> {
        let entries = self.lock();
        urls.iter()
            .filter(|u| entries.get(u.as_str()) != Some(&Status::Completed))
            .cloned()
            .collect()
    }

    /// Merge `url -> status` and persist the whole mapping before returning.
    /// The in-memory update is kept even if the write fails.
    pub fn record_outcome(&self, url: &str, status: Status) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(url.to_string(), status);
        persist::write_entries(&self.path, &entries)
    }

    /// Copy of the current mapping, sorted by URL.
    pub fn entries(&self) -> Vec<(String, Status)> {
        self.lock()
            .iter()
            .map(|(u, s)| (u.clone(), *s))
            .collect()
    }

    pub fn counts(&self) -> LedgerCounts {
        let entries = self.lock();
        let completed = entries.values().filter(|s| **s == Status::Completed).count();
        LedgerCounts {
            completed,
            failed: entries.len() - completed,
        }
    }

    // A worker that panicked while holding the lock cannot leave the map half-updated
    // (insert is the only mutation), so recover from poisoning instead of cascading.
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Same file name in the same directory, comparing directories by their
/// canonical form when both exist.
fn same_location(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    if a.file_name() != b.file_name() {
        return false;
    }
    let dir = |p: &Path| match p.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match (dir(a).canonicalize(), dir(b).canonicalize()) {
        (Ok(da), Ok(db)) => da == db,
        _ => false,
    }
}
