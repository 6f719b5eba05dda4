//! Application settings persisted as JSON
//!
//! Missing file -> defaults. Malformed file -> error with context, so a typo in
//! the config is reported instead of silently ignored.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::paths::{self, PathConfig};

/// Settings file name inside the config directory
pub const CONFIG_FILE: &str = "mediashelf.json";

/// Default metadata store file name inside the data directory
pub const STORE_FILE: &str = "mediashelf_videos.json";

/// Thumbnail pipeline options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Consult and fill the image cache
    pub use_cache: bool,
    /// Primary cache budget in bytes
    pub cache_size_bytes: usize,
    /// Worker threads; `<= 0` runs loads inline on the caller's thread
    pub worker_count: i32,
    /// Advisory worker priority (diagnostics only)
    pub worker_priority: i32,
    /// Track running workers per target and cancel them when superseded
    pub interrupt_stale_workers: bool,
    /// Debug aid: sleep before every load
    pub artificial_delay: bool,
    /// Center-crop file/scraper thumbnails to `[w, h]`
    pub thumbnail_size: Option<(u32, u32)>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_size_bytes: 4 * 1024 * 1024,
            worker_count: 2,
            worker_priority: 0,
            interrupt_stale_workers: false,
            artificial_delay: false,
            thumbnail_size: None,
        }
    }
}

impl PipelineConfig {
    /// Configuration that runs every load inline (tests, one-shot tools)
    pub fn inline() -> Self {
        Self {
            worker_count: 0,
            ..Self::default()
        }
    }

    pub fn runs_inline(&self) -> bool {
        self.worker_count <= 0
    }
}

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    /// Metadata store file name, resolved against the data directory
    pub store_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            store_file: STORE_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `mediashelf.json` from the resolved config directory
    pub fn load(path_config: &PathConfig) -> Result<Self> {
        Self::load_from(&paths::config_file(CONFIG_FILE, path_config))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
