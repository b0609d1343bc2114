//! Ledger file I/O: pretty JSON, rewritten whole via temp file + rename.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::Status;

pub(super) type Entries = BTreeMap<String, Status>;

#[derive(Debug, Error)]
pub(super) enum ReadError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the persisted mapping. `Ok(None)` when the file does not exist.
pub(super) fn read_entries(path: &Path) -> Result<Option<Entries>, ReadError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ReadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| ReadError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes the full mapping and replaces the file at `path`.
/// Writes a sibling temp file first so a crash mid-write never leaves a torn ledger.
pub(super) fn write_entries(path: &Path, entries: &Entries) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(entries).context("serialize ledger")?;
    let tmp = sibling(path, "tmp");
    std::fs::write(&tmp, json).with_context(|| format!("write ledger: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Moves an unparseable ledger aside so it can be inspected; returns the new path.
pub(super) fn quarantine(path: &Path) -> Result<PathBuf> {
    let dest = sibling(path, "corrupt");
    std::fs::rename(path, &dest)
        .with_context(|| format!("rename {} to {}", path.display(), dest.display()))?;
    Ok(dest)
}

pub(super) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
