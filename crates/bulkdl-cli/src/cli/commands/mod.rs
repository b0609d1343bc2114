//! CLI command handlers.

mod run;
mod status;

pub use run::{run_batch_command, RunArgs};
pub use status::run_status;

use bulkdl_core::config::BulkConfig;
use bulkdl_core::ledger::Ledger;
use std::path::{Path, PathBuf};

/// Ledger location: `--ledger`, then `ledger_path` from config, then the
/// download directory default.
pub(crate) fn ledger_path(cfg: &BulkConfig, download_dir: &Path, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| cfg.ledger_path.clone())
        .unwrap_or_else(|| Ledger::default_path(download_dir))
}
