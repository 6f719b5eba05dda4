use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Build version with decoder info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Images: image 0.25 (png, jpeg, bmp, gif, webp)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Media library helper: identify video files and build thumbnails
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable logging to file (default: mediashelf.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", global = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Guess movie / TV show identity from file names and folders
    Identify {
        /// Files or glob patterns (`/media/**/*.mkv`); plain strings are used as-is
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Parse free text as typed by a user instead of file names
        #[arg(short = 'i', long = "input", value_name = "TEXT")]
        input: Option<String>,

        /// Save results into the metadata store
        #[arg(short = 'r', long = "record")]
        record: bool,
    },

    /// Decode thumbnails through the image pipeline and report the outcome
    Thumbs {
        /// Image files or glob patterns
        #[arg(value_name = "PATTERN", required = true)]
        patterns: Vec<String>,

        /// Thumbnail size as WIDTHxHEIGHT (overrides config)
        #[arg(short = 's', long = "size", value_name = "WxH")]
        size: Option<String>,

        /// Worker threads; 0 decodes inline (overrides config)
        #[arg(short = 'w', long = "workers", value_name = "N")]
        workers: Option<i32>,

        /// Seconds to wait for outstanding loads
        #[arg(long = "timeout", value_name = "SECS", default_value = "30")]
        timeout_secs: u64,
    },
}

/// Parse `96x64` into (96, 64)
pub fn parse_size(text: &str) -> Option<(u32, u32)> {
    let (w, h) = text.split_once(['x', 'X'])?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}
