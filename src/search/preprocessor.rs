//! Ordered matcher chain turning file URIs and typed text into `SearchInfo`
//!
//! **Why**: Scrapers need a clean title/year or show/season/episode. File names
//! come in many shapes; each shape has a dedicated matcher and the first one in
//! priority order that recognizes the input decides.
//!
//! **Used by**: CLI `identify`, metadata store updates
//!
//! The matcher list is fixed at construction and read-only afterwards, so one
//! preprocessor can be shared freely across threads.

use log::{debug, trace};

use super::info::SearchInfo;
use super::matchers::{InputMatcher, default_matchers};
use super::uri;

pub struct SearchPreprocessor {
    matchers: Vec<Box<dyn InputMatcher>>,
}

impl Default for SearchPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchPreprocessor {
    pub fn new() -> Self {
        Self {
            matchers: default_matchers(),
        }
    }

    /// Matcher names in priority order
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    fn file_matcher(&self, uri: &str, simplified: &str) -> &dyn InputMatcher {
        self.matchers
            .iter()
            .find(|m| m.matches_file_input(uri, simplified))
            .map(|m| m.as_ref())
            // The default movie matcher accepts everything
            .unwrap_or_else(|| panic!("no matcher accepted file input {:?}", uri))
    }

    fn user_matcher(&self, input: &str) -> &dyn InputMatcher {
        self.matchers
            .iter()
            .find(|m| m.matches_user_input(input))
            .map(|m| m.as_ref())
            .unwrap_or_else(|| panic!("no matcher accepted user input {:?}", input))
    }

    /// Identify `uri`; `simplified` is the same URI without its extension.
    ///
    /// # Panics
    /// If a matcher claims the input but then produces nothing.
    pub fn parse_file_based(&self, uri: &str, simplified: &str) -> SearchInfo {
        let matcher = self.file_matcher(uri, simplified);
        let info = matcher
            .file_input_match(uri, simplified)
            .unwrap_or_else(|| panic!("{} matched {:?} but produced no result", matcher.name(), uri));
        debug!("{} -> {} ({})", uri, info, matcher.name());
        self.re_parse_info(info)
    }

    /// `parse_file_based` with the simplified URI derived here
    pub fn parse_file(&self, uri: &str) -> SearchInfo {
        self.parse_file_based(uri, uri::strip_extension(uri))
    }

    /// Identify free text typed by the user; `file` is kept for provenance
    pub fn parse_user_input(&self, input: &str, file: &str) -> SearchInfo {
        let matcher = self.user_matcher(input);
        let info = matcher
            .user_input_match(input, file)
            .unwrap_or_else(|| panic!("{} matched user input {:?} but produced no result", matcher.name(), input));
        debug!("{:?} -> {} ({})", input, info, matcher.name());
        self.re_parse_info(info)
    }

    /// Re-run the chain on the effective text until no reparse is needed.
    /// Infos produced from user input carry no override and no force flag,
    /// so this settles after one step.
    pub fn re_parse_info(&self, info: SearchInfo) -> SearchInfo {
        if !info.needs_reparse() {
            return info;
        }
        let input = info.effective_input().to_string();
        let matcher = self.user_matcher(&input);
        trace!("Reparsing {:?} with {}", input, matcher.name());
        let reparsed = matcher
            .user_input_match(&input, info.file())
            .unwrap_or_else(|| panic!("{} matched user input {:?} but produced no result", matcher.name(), input));
        self.re_parse_info(reparsed)
    }

    /// Name of the matcher that wins for `uri`
    pub fn file_matcher_name(&self, uri: &str) -> &'static str {
        self.file_matcher(uri, uri::strip_extension(uri)).name()
    }
}
