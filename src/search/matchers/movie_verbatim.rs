//! Quoted user input is taken literally: `"Foo Bar"` searches for `Foo Bar`.

use std::sync::LazyLock;

use regex::Regex;

use super::InputMatcher;
use crate::search::clean::compile;
use crate::search::info::SearchInfo;

static QUOTED: LazyLock<Regex> = LazyLock::new(|| compile(r#"^\s*"(?P<title>[^"]+)"\s*$"#));

#[derive(Debug, Default, Clone, Copy)]
pub struct MovieVerbatimMatcher;

impl InputMatcher for MovieVerbatimMatcher {
    fn name(&self) -> &'static str {
        "MovieVerbatimMatcher"
    }

    fn matches_file_input(&self, _file: &str, _simplified: &str) -> bool {
        false
    }

    fn file_input_match(&self, _file: &str, _simplified: &str) -> Option<SearchInfo> {
        None
    }

    fn matches_user_input(&self, input: &str) -> bool {
        QUOTED.is_match(input)
    }

    fn user_input_match(&self, input: &str, file: &str) -> Option<SearchInfo> {
        let caps = QUOTED.captures(input)?;
        Some(SearchInfo::movie(file, &caps["title"], None))
    }
}
