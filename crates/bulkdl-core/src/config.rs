use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::transfer::TransferOptions;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL (including the first).
    pub max_attempts: u32,
    /// Delay in seconds after the first failed attempt; doubles per attempt.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 60,
        }
    }
}

/// Global configuration loaded from `~/.config/bulkdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Number of transfers running at once.
    pub max_workers: usize,
    /// Connect timeout and stall timeout for each request, in seconds.
    pub request_timeout_secs: u64,
    /// Receive buffer size in bytes; the body reaches disk in chunks of at most this size.
    pub chunk_size: usize,
    /// Ledger location; defaults to `<download_dir>/download_progress.json`.
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            request_timeout_secs: 30,
            chunk_size: 8192,
            ledger_path: None,
            retry: None,
        }
    }
}

impl BulkConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from_config)
            .unwrap_or_default()
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            chunk_size: self.chunk_size,
            retry: self.retry_policy(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BulkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BulkConfig = toml::from_str(&data)?;
    Ok(cfg)
}
