//! Per-target-path mutual exclusion.
//!
//! Two queued URLs can map to the same file (a URL listed twice, or distinct
//! URLs with the same last path segment). Holding the path's lock for the
//! whole transfer keeps their writes from interleaving; they run one after
//! the other instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `path`; the same `Arc` is returned for equal paths.
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}
