//! Verification settings loaded from `~/.config/relcheck/config.toml`.
//!
//! The config is read once, optionally adjusted by the caller (CLI flags),
//! and then passed by reference to every check. Nothing mutates it afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checksum::DEFAULT_CHUNK_SIZE;

/// Smallest accepted `engine.chunk_size`; each chunk costs a file handle.
pub const MIN_CHUNK_SIZE: u64 = 64 * 1024;

/// How file content is read for CRC32 computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Parallel chunked reads when the release sits on a non-rotational device.
    #[default]
    Auto,
    /// Always chunk and hash in parallel (fast on SSDs).
    Parallel,
    /// Always read the file front to back (best for spinning disks).
    Sequential,
}

/// Checksum engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub read_mode: ReadMode,
    /// Worker threads per file in parallel mode; 0 = available parallelism.
    pub hash_threads: usize,
    /// Chunk size in bytes for parallel mode.
    pub chunk_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_mode: ReadMode::Auto,
            hash_threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Remote record lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the record API; `details/<release>` is appended.
    pub api_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.srrdb.com/v1".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 15,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Optional wall-clock limit for a whole check run, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl VerifyConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.chunk_size < MIN_CHUNK_SIZE {
            anyhow::bail!(
                "engine.chunk_size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE,
                self.engine.chunk_size
            );
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("relcheck")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VerifyConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VerifyConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<VerifyConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: VerifyConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
