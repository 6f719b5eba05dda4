//! Processor and target abstractions for the image pipeline.
//!
//! A processor knows how to turn one kind of `LoadObject` into a `Thumbnail`
//! and owns the UI policy for success and failure. Targets are the UI slots
//! the pipeline paints into; they never leave the UI thread.

use std::sync::Arc;

use super::task::{LoadObject, LoadTask};
use super::thumbnail::Thumbnail;

/// UI slot that can display a decoded image or a fallback visual.
///
/// Called on the UI thread only. Implementations typically use interior
/// mutability since the pipeline holds them behind `Rc`.
pub trait ImageTarget {
    fn show_image(&self, image: &Thumbnail);

    /// `None` when no placeholder visual is configured (clear the slot)
    fn show_placeholder(&self, placeholder: Option<&Thumbnail>);
}

/// What the pipeline should do after a failed load
pub enum ErrorHandling {
    /// Fall through to the default placeholder
    Unhandled,
    /// The processor already updated the target
    Handled,
    /// Start a fresh load for the same target (e.g. next step of a chain)
    Reissue {
        processor: Arc<dyn ImageProcessor>,
        object: LoadObject,
    },
}

/// How to load one kind of object and how to present the outcome.
///
/// `can_handle`/`key` are pure; `load` runs on a worker thread and must fill
/// `task.result`; the remaining hooks run on the UI thread.
pub trait ImageProcessor: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn can_handle(&self, object: &LoadObject) -> bool;

    /// Cache key; the same logical image must always give the same key.
    /// `None` means the object cannot be loaded at all.
    fn key(&self, object: &LoadObject) -> Option<String>;

    fn load(&self, task: &mut LoadTask);

    fn handle_load_error(&self, _target: &dyn ImageTarget, _task: &LoadTask) -> ErrorHandling {
        ErrorHandling::Unhandled
    }

    fn apply_result(&self, target: &dyn ImageTarget, task: &LoadTask) {
        if let Some(image) = &task.result.payload {
            target.show_image(image);
        }
    }

    fn apply_placeholder(&self, target: &dyn ImageTarget, placeholder: Option<&Thumbnail>) {
        target.show_placeholder(placeholder);
    }
}
