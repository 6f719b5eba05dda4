//! Movie folder named `Title Words (YYYY)`, e.g. `/movies/Titanic (1997)/movie.avi`

use std::sync::LazyLock;

use regex::Regex;

use super::InputMatcher;
use crate::search::clean::{clean_up_name, compile};
use crate::search::info::SearchInfo;
use crate::search::uri;

static TITLE_YEAR_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?P<title>.*?[^\s[:punct:]].*?)[\s[:punct:]]*\((?P<year>(?:19|20)\d{2})\)(?:[\s[:punct:]].*)?$")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MoviePathMatcher;

impl InputMatcher for MoviePathMatcher {
    fn name(&self) -> &'static str {
        "MoviePathMatcher"
    }

    fn matches_file_input(&self, file: &str, simplified: &str) -> bool {
        self.file_input_match(file, simplified).is_some()
    }

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo> {
        let caps = TITLE_YEAR_FOLDER.captures(uri::parent_name(simplified)?)?;
        let title = clean_up_name(caps.name("title")?.as_str());
        if title.is_empty() {
            return None;
        }
        Some(SearchInfo::movie(file, title, Some(caps["year"].to_string())))
    }

    fn matches_user_input(&self, _input: &str) -> bool {
        false
    }

    fn user_input_match(&self, _input: &str, _file: &str) -> Option<SearchInfo> {
        None
    }
}
