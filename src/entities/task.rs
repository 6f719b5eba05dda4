//! Load requests and the task value that travels to a worker and back
//!
//! A `LoadTask` is built per `ImagePipeline::set()` call, executed by exactly one
//! worker (or inline), then delivered on the UI thread. Validity is decided at
//! delivery by comparing the task's key with the target's current mapping; the
//! cancel token only lets work be skipped early.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::processor::ImageProcessor;
use super::thumbnail::Thumbnail;

/// Identity of a UI slot, stable while the slot is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub usize);

/// Outcome of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Ok,
    Error,
    /// Load object not understood by the processor
    BadObject,
    /// Not run to completion (cancelled, panicked before finishing)
    Unfinished,
}

/// Result slot filled by `ImageProcessor::load`
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub payload: Option<Thumbnail>,
    pub status: LoadStatus,
}

impl Default for LoadResult {
    fn default() -> Self {
        Self {
            payload: None,
            status: LoadStatus::Unfinished,
        }
    }
}

impl LoadResult {
    pub fn ok(payload: Thumbnail) -> Self {
        Self {
            payload: Some(payload),
            status: LoadStatus::Ok,
        }
    }

    pub fn failed(status: LoadStatus) -> Self {
        Self { payload: None, status }
    }
}

/// Cooperative cancellation flag shared between the pipeline and one task
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Descriptor of an image previously found by a remote scraper.
///
/// `url` is the logical identity; `local_path` is where the download lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    pub url: String,
    pub local_path: PathBuf,
}

impl RemoteImage {
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
        }
    }
}

/// What to load. Each processor accepts a subset of these.
#[derive(Debug, Clone)]
pub enum LoadObject {
    Path(PathBuf),
    Remote(RemoteImage),
    Chain(ChainState),
}

/// One attempt inside a fallback chain
#[derive(Clone)]
pub struct ChainStep {
    pub processor: Arc<dyn ImageProcessor>,
    pub object: LoadObject,
}

impl ChainStep {
    pub fn new(processor: Arc<dyn ImageProcessor>, object: LoadObject) -> Self {
        Self { processor, object }
    }
}

impl fmt::Debug for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStep")
            .field("processor", &self.processor.name())
            .field("object", &self.object)
            .finish()
    }
}

/// Ordered (processor, object) attempts plus a cursor
#[derive(Debug, Clone)]
pub struct ChainState {
    steps: Arc<[ChainStep]>,
    cursor: usize,
}

impl ChainState {
    pub fn new(steps: Vec<ChainStep>) -> Self {
        Self {
            steps: steps.into(),
            cursor: 0,
        }
    }

    /// Step under the cursor, `None` once exhausted (or empty)
    pub fn current(&self) -> Option<&ChainStep> {
        self.steps.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when the cursor sits on the final step
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.steps.len()
    }

    /// Same chain with the cursor moved one step, `None` if nothing is left
    pub fn advanced(&self) -> Option<ChainState> {
        let next = self.cursor + 1;
        (next < self.steps.len()).then(|| ChainState {
            steps: Arc::clone(&self.steps),
            cursor: next,
        })
    }
}

/// Unit of work for one `set()` call
pub struct LoadTask {
    id: u64,
    target: TargetId,
    key: String,
    processor: Arc<dyn ImageProcessor>,
    object: LoadObject,
    cancel: CancelToken,
    pub result: LoadResult,
}

impl LoadTask {
    pub fn new(
        id: u64,
        target: TargetId,
        key: String,
        processor: Arc<dyn ImageProcessor>,
        object: LoadObject,
    ) -> Self {
        Self {
            id,
            target,
            key,
            processor,
            object,
            cancel: CancelToken::new(),
            result: LoadResult::default(),
        }
    }

    /// Fresh task for a nested step, sharing identity, key and cancel token
    /// with `self` but with its own processor, object and empty result.
    pub fn subtask(&self, processor: Arc<dyn ImageProcessor>, object: LoadObject) -> LoadTask {
        LoadTask {
            id: self.id,
            target: self.target,
            key: self.key.clone(),
            processor,
            object,
            cancel: self.cancel.clone(),
            result: LoadResult::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn processor(&self) -> &Arc<dyn ImageProcessor> {
        &self.processor
    }

    pub fn object(&self) -> &LoadObject {
        &self.object
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Take the payload out and dispose it (stale or cancelled delivery)
    pub fn discard_payload(&mut self) {
        if let Some(payload) = self.result.payload.take() {
            payload.dispose();
        }
    }
}

impl fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTask")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("key", &self.key)
            .field("processor", &self.processor.name())
            .field("status", &self.result.status)
            .finish()
    }
}
