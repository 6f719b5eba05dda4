//! Processor for posters/backdrops found by a remote scraper
//!
//! The cache key is the remote URL, not the local file: a re-download may land
//! in a different local file but is still the same logical image.

use std::sync::Arc;

use log::warn;

use super::decoder::Decoder;
use super::fetcher::ImageFetcher;
use super::file_processor::{decode_into, sized_key};
use super::processor::ImageProcessor;
use super::task::{LoadObject, LoadResult, LoadStatus, LoadTask};

pub struct ScraperImageProcessor {
    fetcher: Arc<dyn ImageFetcher>,
    decoder: Arc<dyn Decoder>,
    bounds: Option<(u32, u32)>,
}

impl ScraperImageProcessor {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, decoder: Arc<dyn Decoder>, bounds: Option<(u32, u32)>) -> Self {
        Self { fetcher, decoder, bounds }
    }
}

impl ImageProcessor for ScraperImageProcessor {
    fn name(&self) -> &'static str {
        "scraper"
    }

    fn can_handle(&self, object: &LoadObject) -> bool {
        matches!(object, LoadObject::Remote(_))
    }

    fn key(&self, object: &LoadObject) -> Option<String> {
        match object {
            LoadObject::Remote(remote) if !remote.url.is_empty() => Some(sized_key(&remote.url, self.bounds)),
            _ => None,
        }
    }

    fn load(&self, task: &mut LoadTask) {
        let remote = match task.object() {
            LoadObject::Remote(remote) => remote.clone(),
            _ => {
                task.result = LoadResult::failed(LoadStatus::BadObject);
                return;
            }
        };
        if task.is_cancelled() {
            task.result = LoadResult::failed(LoadStatus::Unfinished);
            return;
        }

        // Blocks this worker until the byte stream completes or fails
        match self.fetcher.download_if_absent(&remote) {
            Ok(path) => decode_into(task, self.decoder.as_ref(), &path, self.bounds),
            Err(e) => {
                warn!("Failed to fetch {}: {}", remote.url, e);
                task.result = LoadResult::failed(LoadStatus::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::decoder::ImageCrateDecoder;
    use crate::entities::fetcher::FetchError;
    use crate::entities::task::{RemoteImage, TargetId};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes a tiny PNG on first request
    struct WritingFetcher {
        calls: AtomicUsize,
    }

    impl ImageFetcher for WritingFetcher {
        fn download_if_absent(&self, image: &RemoteImage) -> Result<PathBuf, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !image.local_path.exists() {
                image::RgbaImage::from_pixel(6, 6, image::Rgba([1, 2, 3, 255]))
                    .save(&image.local_path)
                    .map_err(|e| FetchError::Io(e.to_string()))?;
            }
            Ok(image.local_path.clone())
        }
    }

    struct FailingFetcher;

    impl ImageFetcher for FailingFetcher {
        fn download_if_absent(&self, image: &RemoteImage) -> Result<PathBuf, FetchError> {
            Err(FetchError::NotFound(image.url.clone()))
        }
    }

    #[test]
    fn test_key_is_url_not_local_path() {
        let p = ScraperImageProcessor::new(Arc::new(FailingFetcher), Arc::new(ImageCrateDecoder), None);
        let a = LoadObject::Remote(RemoteImage::new("http://img/poster.jpg", "/cache/1.jpg"));
        let b = LoadObject::Remote(RemoteImage::new("http://img/poster.jpg", "/cache/2.jpg"));
        assert_eq!(p.key(&a), p.key(&b));
        assert_eq!(p.key(&a).as_deref(), Some("http://img/poster.jpg"));
        assert!(p.key(&LoadObject::Path(PathBuf::from("/x"))).is_none());
    }

    #[test]
    fn test_download_then_decode() {
        let dir = std::env::temp_dir().join("mediashelf_scraper_processor");
        let _ = std::fs::create_dir_all(&dir);
        let local = dir.join("poster.png");
        let _ = std::fs::remove_file(&local);

        let fetcher = Arc::new(WritingFetcher { calls: AtomicUsize::new(0) });
        let p = Arc::new(ScraperImageProcessor::new(fetcher.clone(), Arc::new(ImageCrateDecoder), None));
        let obj = LoadObject::Remote(RemoteImage::new("http://img/poster.png", local.clone()));
        let mut task = LoadTask::new(7, TargetId(3), p.key(&obj).unwrap(), p.clone(), obj);

        p.load(&mut task);
        assert_eq!(task.result.status, LoadStatus::Ok);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(task.result.payload.as_ref().map(|t| t.width()), Some(6));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_fetch_failure_is_load_error() {
        let p = Arc::new(ScraperImageProcessor::new(Arc::new(FailingFetcher), Arc::new(ImageCrateDecoder), None));
        let obj = LoadObject::Remote(RemoteImage::new("http://img/missing.jpg", "/nope/missing.jpg"));
        let mut task = LoadTask::new(1, TargetId(1), "k".into(), p.clone(), obj);
        p.load(&mut task);
        assert_eq!(task.result.status, LoadStatus::Error);
    }
}
