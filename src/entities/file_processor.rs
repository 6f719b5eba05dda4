//! Processor for images already on local storage

use std::path::Path;
use std::sync::Arc;

use log::{trace, warn};

use super::decoder::Decoder;
use super::processor::ImageProcessor;
use super::task::{LoadObject, LoadResult, LoadStatus, LoadTask};

/// Loads `LoadObject::Path` through a `Decoder`, optionally center-cropped
/// to fixed dimensions.
pub struct FileProcessor {
    decoder: Arc<dyn Decoder>,
    bounds: Option<(u32, u32)>,
}

impl FileProcessor {
    pub fn new(decoder: Arc<dyn Decoder>, bounds: Option<(u32, u32)>) -> Self {
        Self { decoder, bounds }
    }

    pub fn bounds(&self) -> Option<(u32, u32)> {
        self.bounds
    }
}

/// Key for a local image at a given output size
pub(crate) fn sized_key(base: &str, bounds: Option<(u32, u32)>) -> String {
    match bounds {
        Some((w, h)) => format!("{}#{}x{}", base, w, h),
        None => base.to_string(),
    }
}

/// Shared decode step for processors that end on a local file
pub(crate) fn decode_into(task: &mut LoadTask, decoder: &dyn Decoder, path: &Path, bounds: Option<(u32, u32)>) {
    if task.is_cancelled() {
        trace!("Skipping decode of {} (cancelled)", path.display());
        task.result = LoadResult::failed(LoadStatus::Unfinished);
        return;
    }
    task.result = match decoder.decode(path, bounds) {
        Ok(thumb) => LoadResult::ok(thumb),
        Err(e) => {
            warn!("Failed to decode {}: {}", path.display(), e);
            LoadResult::failed(LoadStatus::Error)
        }
    };
}

impl ImageProcessor for FileProcessor {
    fn name(&self) -> &'static str {
        "file"
    }

    fn can_handle(&self, object: &LoadObject) -> bool {
        matches!(object, LoadObject::Path(_))
    }

    fn key(&self, object: &LoadObject) -> Option<String> {
        match object {
            LoadObject::Path(path) if !path.as_os_str().is_empty() => {
                Some(sized_key(&path.to_string_lossy(), self.bounds))
            }
            _ => None,
        }
    }

    fn load(&self, task: &mut LoadTask) {
        let path = match task.object() {
            LoadObject::Path(path) => path.clone(),
            _ => {
                task.result = LoadResult::failed(LoadStatus::BadObject);
                return;
            }
        };
        decode_into(task, self.decoder.as_ref(), &path, self.bounds);
    }
}
