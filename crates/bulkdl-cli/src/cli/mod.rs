//! CLI for the bulkdl resumable bulk downloader.

mod commands;

use anyhow::Result;
use bulkdl_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch_command, run_status, RunArgs};

/// Top-level CLI for bulkdl.
#[derive(Debug, Parser)]
#[command(name = "bulkdl")]
#[command(about = "bulkdl: concurrent, resumable bulk file downloader", long_about = None)]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to ~/.local/state/bulkdl/bulkdl.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL in a list that is not yet completed.
    Run {
        /// File with one URL per line; blank lines are ignored.
        url_file: PathBuf,

        /// Directory to download into (created if missing; default: current directory).
        #[arg(short = 'd', long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Number of concurrent downloads (default: max_workers from config).
        #[arg(short = 'j', long, value_name = "N")]
        workers: Option<usize>,

        /// Progress ledger (default: DIR/download_progress.json).
        #[arg(long, value_name = "PATH")]
        ledger: Option<PathBuf>,

        /// Exit with status 1 if any URL failed.
        #[arg(long)]
        strict: bool,

        /// Do not print per-file progress lines.
        #[arg(long)]
        no_progress: bool,
    },

    /// Show the per-URL outcomes recorded in a ledger.
    Status {
        /// Download directory whose default ledger to read (default: current directory).
        #[arg(short = 'd', long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Ledger to read instead of the default.
        #[arg(long, value_name = "PATH")]
        ledger: Option<PathBuf>,
    },
}

impl Cli {
    /// Runs the parsed command. `Ok(false)` means the command finished but
    /// wants a nonzero exit (`run --strict` with failures).
    pub async fn run(self) -> Result<bool> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Run {
                url_file,
                download_dir,
                workers,
                ledger,
                strict,
                no_progress,
            } => {
                let args = RunArgs {
                    url_file,
                    download_dir: resolve_dir(download_dir)?,
                    workers,
                    ledger,
                    show_progress: !no_progress,
                };
                let summary = run_batch_command(&cfg, args).await?;
                Ok(!(strict && !summary.all_succeeded()))
            }
            CliCommand::Status {
                download_dir,
                ledger,
            } => {
                run_status(&cfg, &resolve_dir(download_dir)?, ledger.as_deref())?;
                Ok(true)
            }
        }
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(d) => Ok(d),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
