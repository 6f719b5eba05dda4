//! Scene release names: `The.Movie.Name.2011.DiRECTORS.CUT.x264-GRP`.
//! Everything before the year is the title, minus edition tags directly in
//! front of the year.

use std::sync::LazyLock;

use regex::Regex;

use super::InputMatcher;
use crate::search::clean::{clean_up_name, compile};
use crate::search::info::SearchInfo;
use crate::search::uri;

static RELEASE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?P<title>[^\s.]+(?:[. ][^\s.]+)*?)[. ](?P<year>(?:19|20)\d{2})[. ](?P<junk>\S.*)$")
});

/// Edition words that end up between title and year
const EDITION_TOKENS: &[&str] = &[
    "cut", "edition", "version", "unrated", "uncut", "extended", "directors", "director's", "dc", "theatrical",
    "remastered", "special", "collectors", "collector's", "ultimate", "final", "limited", "alternate",
];

fn strip_edition_tokens(title: &str) -> String {
    let mut tokens: Vec<&str> = title.split(['.', ' ']).filter(|t| !t.is_empty()).collect();
    while tokens.len() > 1 {
        let last = tokens[tokens.len() - 1].to_ascii_lowercase();
        if !EDITION_TOKENS.contains(&last.as_str()) {
            break;
        }
        tokens.pop();
    }
    tokens.join(" ")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MovieSceneMatcher;

impl MovieSceneMatcher {
    fn parse(text: &str, file: &str) -> Option<SearchInfo> {
        let caps = RELEASE_NAME.captures(text)?;
        let title = clean_up_name(&strip_edition_tokens(caps.name("title")?.as_str()));
        if title.is_empty() {
            return None;
        }
        Some(SearchInfo::movie(file, title, Some(caps["year"].to_string())))
    }
}

impl InputMatcher for MovieSceneMatcher {
    fn name(&self) -> &'static str {
        "MovieSceneMatcher"
    }

    fn matches_file_input(&self, file: &str, simplified: &str) -> bool {
        self.file_input_match(file, simplified).is_some()
    }

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo> {
        Self::parse(uri::file_name(simplified), file)
    }

    fn matches_user_input(&self, input: &str) -> bool {
        self.user_input_match(input, "").is_some()
    }

    fn user_input_match(&self, input: &str, file: &str) -> Option<SearchInfo> {
        Self::parse(input.trim(), file)
    }
}
