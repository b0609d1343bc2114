//! `bulkdl run` – download every pending URL in a list.

use anyhow::{Context, Result};
use bulkdl_core::config::BulkConfig;
use bulkdl_core::ledger::Ledger;
use bulkdl_core::progress::{ChannelProgress, ProgressEvent, ProgressStats};
use bulkdl_core::scheduler::{self, RunSummary};
use bulkdl_core::transfer::TransferContext;
use bulkdl_core::url_list;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Resolved arguments for one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub url_file: PathBuf,
    pub download_dir: PathBuf,
    pub workers: Option<usize>,
    pub ledger: Option<PathBuf>,
    pub show_progress: bool,
}

pub async fn run_batch_command(cfg: &BulkConfig, args: RunArgs) -> Result<RunSummary> {
    std::fs::create_dir_all(&args.download_dir).with_context(|| {
        format!(
            "failed to create download directory {}",
            args.download_dir.display()
        )
    })?;
    let urls = url_list::read_url_list(&args.url_file)?;
    let ledger_path = super::ledger_path(cfg, &args.download_dir, args.ledger.as_deref());
    let ledger = Arc::new(Ledger::load(ledger_path));
    let max_workers = args.workers.unwrap_or(cfg.max_workers);

    let mut ctx = TransferContext::new(cfg.transfer_options());
    let printer = if args.show_progress {
        let (tx, rx) = tokio::sync::mpsc::channel::<ProgressEvent>(256);
        ctx = ctx.with_progress(Arc::new(ChannelProgress::new(tx)));
        Some(tokio::spawn(print_progress(rx)))
    } else {
        None
    };

    let summary = tokio::task::spawn_blocking({
        let dir = args.download_dir.clone();
        let ledger = Arc::clone(&ledger);
        let ctx = Arc::new(ctx);
        move || scheduler::run_batch(&urls, &dir, ledger, ctx, max_workers)
    })
    .await
    .context("download pool task join")?;

    // The pool dropped the last sender, so the printer ends once drained.
    if let Some(handle) = printer {
        let _ = handle.await;
    }

    print_summary(&summary, &ledger);
    Ok(summary)
}

struct FileLine {
    filename: String,
    started: Instant,
    last_print: Option<Instant>,
    stats: ProgressStats,
}

/// Prints at most one line per file every `PROGRESS_INTERVAL`, plus one on
/// completion.
async fn print_progress(mut rx: tokio::sync::mpsc::Receiver<ProgressEvent>) {
    let mut files: HashMap<String, FileLine> = HashMap::new();
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Started {
                url,
                filename,
                initial,
                total,
            } => {
                files.insert(
                    url,
                    FileLine {
                        filename,
                        started: Instant::now(),
                        last_print: None,
                        stats: ProgressStats {
                            bytes_done: initial,
                            initial,
                            total_bytes: total,
                            elapsed: Duration::ZERO,
                        },
                    },
                );
            }
            ProgressEvent::Advanced { url, bytes_done } => {
                let Some(line) = files.get_mut(&url) else {
                    continue;
                };
                let now = Instant::now();
                line.stats.bytes_done = bytes_done;
                line.stats.elapsed = now.duration_since(line.started);
                let due = line
                    .last_print
                    .map_or(true, |t| now.duration_since(t) >= PROGRESS_INTERVAL);
                if due {
                    println!("  {}", format_line(&line.filename, &line.stats));
                    line.last_print = Some(now);
                }
            }
            ProgressEvent::Finished { url, success } => {
                if let Some(line) = files.remove(&url) {
                    let mark = if success { "done" } else { "FAILED" };
                    println!("  {} [{}]", line.filename, mark);
                }
            }
        }
    }
}

fn format_line(filename: &str, stats: &ProgressStats) -> String {
    let done_mib = stats.bytes_done as f64 / 1_048_576.0;
    let rate_mib = stats.bytes_per_sec() / 1_048_576.0;
    let eta = stats
        .eta_secs()
        .map(|s| format!("{:.0}s", s))
        .unwrap_or_else(|| "?".to_string());
    match (stats.total_bytes, stats.fraction()) {
        (Some(total), Some(frac)) => format!(
            "{}  {:.1} / {:.1} MiB ({:.1}%)  {:.2} MiB/s  ETA {}",
            filename,
            done_mib,
            total as f64 / 1_048_576.0,
            frac * 100.0,
            rate_mib,
            eta
        ),
        _ => format!("{}  {:.1} MiB  {:.2} MiB/s", filename, done_mib, rate_mib),
    }
}

fn print_summary(summary: &RunSummary, ledger: &Ledger) {
    println!(
        "{} URL(s): {} downloaded, {} failed, {} already complete",
        summary.total, summary.succeeded, summary.failed, summary.skipped
    );
    for (url, err) in &summary.failures {
        println!("  failed: {}  ({})", url, err);
    }
    if summary.failed > 0 {
        println!(
            "Failed URLs are retried on the next run (ledger: {}).",
            ledger.path().display()
        );
    }
}
