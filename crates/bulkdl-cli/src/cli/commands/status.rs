//! `bulkdl status` – show the outcomes recorded in a ledger.

use anyhow::{Context, Result};
use bulkdl_core::config::BulkConfig;
use bulkdl_core::ledger::Ledger;
use std::path::Path;

/// Read-only: a corrupt ledger is reported as an error and left untouched.
pub fn run_status(cfg: &BulkConfig, download_dir: &Path, ledger: Option<&Path>) -> Result<()> {
    let path = super::ledger_path(cfg, download_dir, ledger);
    let Some(ledger) =
        Ledger::inspect(&path).with_context(|| format!("ledger {}", path.display()))?
    else {
        println!("No ledger at {}.", path.display());
        return Ok(());
    };
    let entries = ledger.entries();
    if entries.is_empty() {
        println!("Ledger {} is empty.", ledger.path().display());
        return Ok(());
    }
    println!("{:<10} {}", "STATUS", "URL");
    for (url, status) in &entries {
        println!("{:<10} {}", status.as_str(), url);
    }
    let counts = ledger.counts();
    println!(
        "{} completed, {} failed ({})",
        counts.completed,
        counts.failed,
        ledger.path().display()
    );
    Ok(())
}
