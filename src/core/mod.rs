//! Core engine modules - cache, fetch coalescing, pipeline, workers
//!
//! These modules run the thumbnail machinery, independent of any UI toolkit.

pub mod fetch;
pub mod image_cache;
pub mod pipeline;
pub mod workers;

// Re-exports for convenience
pub use fetch::{CoalescingFetcher, LocalFileFetcher};
pub use image_cache::{CacheStats, ImageCache};
pub use pipeline::{ARTIFICIAL_DELAY, ImagePipeline, SetOutcome, target_id};
pub use workers::Workers;
