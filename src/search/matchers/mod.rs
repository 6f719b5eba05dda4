//! Rule-based recognizers for filenames, paths and typed search text
//!
//! Each matcher is a pure, stateless regex extraction. `SearchPreprocessor`
//! owns them in a fixed priority order; the first one that matches wins.
//!
//! Contract: when `matches_file_input` (or `matches_user_input`) returns true,
//! the corresponding `*_match` call for the same input must return `Some`.

mod movie_default;
mod movie_dvd;
mod movie_path;
mod movie_scene;
mod movie_verbatim;
mod tv_folder;
mod tv_path;
mod tv_show;

pub use movie_default::MovieDefaultMatcher;
pub use movie_dvd::MovieDvdMatcher;
pub use movie_path::MoviePathMatcher;
pub use movie_scene::MovieSceneMatcher;
pub use movie_verbatim::MovieVerbatimMatcher;
pub use tv_folder::TvShowFolderMatcher;
pub use tv_path::TvShowPathMatcher;
pub use tv_show::TvShowMatcher;

use super::info::SearchInfo;

pub trait InputMatcher: Send + Sync {
    /// Stable identifier, reported in logs and by the CLI
    fn name(&self) -> &'static str;

    /// `file` is the full URI, `simplified` the same URI without extension
    fn matches_file_input(&self, file: &str, simplified: &str) -> bool;

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo>;

    fn matches_user_input(&self, input: &str) -> bool;

    /// `file` is only carried into the result for provenance
    fn user_input_match(&self, input: &str, file: &str) -> Option<SearchInfo>;
}

/// Parse a captured number; unparseable or missing means 0
pub(crate) fn number_or_zero(text: Option<regex::Match<'_>>) -> u32 {
    text.and_then(|m| m.as_str().parse().ok()).unwrap_or(0)
}

/// The matchers in priority order
pub fn default_matchers() -> Vec<Box<dyn InputMatcher>> {
    vec![
        Box::new(TvShowMatcher),
        Box::new(TvShowFolderMatcher),
        Box::new(TvShowPathMatcher),
        Box::new(MovieVerbatimMatcher),
        Box::new(MovieDvdMatcher),
        Box::new(MoviePathMatcher),
        Box::new(MovieSceneMatcher),
        Box::new(MovieDefaultMatcher),
    ]
}
