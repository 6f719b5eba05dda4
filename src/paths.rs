//! Where mediashelf keeps its settings, metadata store and log
//!
//! Resolution order for both directories:
//! 1. `--config-dir` on the command line
//! 2. `MEDIASHELF_CONFIG_DIR` environment variable
//! 3. Current directory, if it already holds one of our files (portable mode)
//! 4. Platform directory from dirs-next
//!
//! Platform paths:
//! - Linux: ~/.config/mediashelf, ~/.local/share/mediashelf
//! - macOS: ~/Library/Application Support/mediashelf
//! - Windows: %APPDATA%\mediashelf

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment override for both directories
pub const CONFIG_DIR_ENV: &str = "MEDIASHELF_CONFIG_DIR";

const APP_DIR: &str = "mediashelf";

/// Files whose presence in the working directory switches to portable mode
const LOCAL_MARKERS: [&str; 3] = ["mediashelf.json", "mediashelf_videos.json", "mediashelf.log"];

/// Overrides for default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom directory (from CLI or ENV), used for config and data alike
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI argument wins over `MEDIASHELF_CONFIG_DIR`
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from));
        Self { config_dir }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Config,
    Data,
}

/// Path to a settings file (e.g. `mediashelf.json`)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(Kind::Config, config).join(name)
}

/// Path to a data file (metadata store, log)
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(Kind::Data, config).join(name)
}

/// Create the config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(Kind::Config, config);
    let data_dir = resolve_dir(Kind::Data, config);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    LOCAL_MARKERS.iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(kind: Kind, config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    let platform = match kind {
        Kind::Config => dirs_next::config_dir(),
        Kind::Data => dirs_next::data_dir(),
    };
    platform.map(|d| d.join(APP_DIR)).unwrap_or_else(|| PathBuf::from("."))
}
