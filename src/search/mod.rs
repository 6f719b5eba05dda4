//! Media identification from file names, folder layouts and typed text

pub mod clean;
pub mod info;
pub mod matchers;
pub mod preprocessor;
pub mod uri;

pub use info::{Media, MovieInfo, SearchInfo, TvShowInfo};
pub use matchers::InputMatcher;
pub use preprocessor::SearchPreprocessor;
