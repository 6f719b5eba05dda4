//! Byte-source boundary for remote scraper images.
//!
//! Implementations live in `core::fetch` (or in the embedding application).

use std::fmt;
use std::path::PathBuf;

use super::task::RemoteImage;

/// Download failures. `Clone` so one outcome can be handed to every waiter
/// of a coalesced download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    NotFound(String),
    Io(String),
    /// The download owner went away without producing a result
    Aborted,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound(url) => write!(f, "Remote image not found: {}", url),
            FetchError::Io(e) => write!(f, "Fetch I/O error: {}", e),
            FetchError::Aborted => write!(f, "Fetch aborted"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Makes a remote image available on local storage.
///
/// Blocking; called from worker threads only.
pub trait ImageFetcher: Send + Sync {
    /// Return the local path of `image`, downloading it first if needed.
    fn download_if_absent(&self, image: &RemoteImage) -> Result<PathBuf, FetchError>;
}
