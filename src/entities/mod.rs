//! Entities module - image pipeline data types and processors
//!
//! Plain data (thumbnails, tasks, descriptors) plus the processor/target traits
//! the pipeline drives. Nothing here owns threads or UI state.

pub mod chain_processor;
pub mod decoder;
pub mod fetcher;
pub mod file_processor;
pub mod processor;
pub mod scraper_processor;
pub mod task;
pub mod thumbnail;

pub use chain_processor::ChainProcessor;
pub use decoder::{DecodeError, Decoder, ImageCrateDecoder};
pub use fetcher::{FetchError, ImageFetcher};
pub use file_processor::FileProcessor;
pub use processor::{ErrorHandling, ImageProcessor, ImageTarget};
pub use scraper_processor::ScraperImageProcessor;
pub use task::{
    CancelToken, ChainState, ChainStep, LoadObject, LoadResult, LoadStatus, LoadTask, RemoteImage, TargetId,
};
pub use thumbnail::{Thumbnail, WeakThumbnail};
