//! mediashelf - media library core
//!
//! Thumbnail loading (bounded two-tier cache, worker pool, stale-result
//! dropping) and filename-based movie / TV show identification.

// Core engine (cache, fetch coalescing, pipeline, workers)
pub mod core;

// Data types and processors
pub mod entities;

// Media identification
pub mod search;

// App modules
pub mod cli;
pub mod config;
pub mod paths;
pub mod runner;
pub mod store;

// Re-export commonly used types
pub use core::image_cache::{CacheStats, ImageCache};
pub use core::pipeline::{ImagePipeline, SetOutcome};
pub use entities::{ImageProcessor, ImageTarget, LoadObject, Thumbnail};
pub use search::{SearchInfo, SearchPreprocessor};
