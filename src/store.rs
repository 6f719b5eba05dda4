//! Video metadata store: resume/bookmark positions, track selections and
//! scrape results per file.
//!
//! The identification engine never reads this; it only hands over
//! `SearchInfo` results through `VideoStore::apply_search_info`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::search::{Media, SearchInfo};

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Parse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Store I/O error: {}", e),
            StoreError::Parse(e) => write!(f, "Store parse error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeKind {
    Movie,
    TvShow,
}

/// One row per video file. `id == 0` means "not stored yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
    pub id: u64,
    pub path: String,
    pub resume_ms: Option<u64>,
    pub bookmark_ms: Option<u64>,
    pub audio_track: Option<i32>,
    pub subtitle_track: Option<i32>,
    pub scrape_kind: Option<ScrapeKind>,
    pub scrape_title: Option<String>,
    pub scrape_year: Option<String>,
    pub scrape_season: Option<u32>,
    pub scrape_episode: Option<u32>,
}

impl VideoRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Copy identification fields from `info`, replacing previous ones
    pub fn set_search_info(&mut self, info: &SearchInfo) {
        match info.media() {
            Media::Movie(m) => {
                self.scrape_kind = Some(ScrapeKind::Movie);
                self.scrape_title = Some(m.title.clone());
                self.scrape_year = m.year.clone();
                self.scrape_season = None;
                self.scrape_episode = None;
            }
            Media::TvShow(t) => {
                self.scrape_kind = Some(ScrapeKind::TvShow);
                self.scrape_title = Some(t.show_name.clone());
                self.scrape_year = t.first_aired_year.clone();
                self.scrape_season = Some(t.season);
                self.scrape_episode = Some(t.episode);
            }
        }
    }
}

pub trait VideoStore {
    fn get(&self, id: u64) -> Option<VideoRecord>;

    fn get_by_path(&self, path: &str) -> Option<VideoRecord>;

    /// Insert (id 0, or unknown path) or update; returns the record id
    fn upsert(&mut self, record: VideoRecord) -> Result<u64, StoreError>;

    /// Record the identification of `info.file()`, keeping playback state
    fn apply_search_info(&mut self, info: &SearchInfo) -> Result<u64, StoreError> {
        let mut record = self
            .get_by_path(info.file())
            .unwrap_or_else(|| VideoRecord::new(info.file()));
        record.set_search_info(info);
        self.upsert(record)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    records: BTreeMap<u64, VideoRecord>,
}

/// JSON-file backed store; memory-only when opened without a path
#[derive(Debug, Default)]
pub struct JsonVideoStore {
    path: Option<PathBuf>,
    data: StoreFile,
}

impl JsonVideoStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open `path`; a missing file starts an empty store
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
            let data: StoreFile =
                serde_json::from_str(&text).map_err(|e| StoreError::Parse(format!("{}: {}", path.display(), e)))?;
            info!("Loaded {} video records from {}", data.records.len(), path.display());
            data
        } else {
            debug!("No video store at {}, starting empty", path.display());
            StoreFile::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &VideoRecord> {
        self.data.records.values()
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.data).map_err(|e| StoreError::Parse(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))
    }
}

impl VideoStore for JsonVideoStore {
    fn get(&self, id: u64) -> Option<VideoRecord> {
        self.data.records.get(&id).cloned()
    }

    fn get_by_path(&self, path: &str) -> Option<VideoRecord> {
        self.data.records.values().find(|r| r.path == path).cloned()
    }

    fn upsert(&mut self, mut record: VideoRecord) -> Result<u64, StoreError> {
        if record.id == 0 || !self.data.records.contains_key(&record.id) {
            record.id = match self.get_by_path(&record.path) {
                Some(existing) => existing.id,
                None => {
                    self.data.next_id += 1;
                    self.data.next_id
                }
            };
        }
        let id = record.id;
        debug!("Upserting video record {} ({})", id, record.path);
        self.data.records.insert(id, record);
        self.save()?;
        Ok(id)
    }
}
