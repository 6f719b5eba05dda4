//! TV episode from the file name itself: `Show.S01E02`, `Show 1x02`,
//! `Show Season 1 Episode 2`. Also accepts the same shapes typed by the user.

use std::sync::LazyLock;

use regex::Regex;

use super::{InputMatcher, number_or_zero};
use crate::search::clean::{compile, split_show_name};
use crate::search::info::SearchInfo;
use crate::search::uri;

static EPISODE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile(r"(?i)^(?P<show>.+?)[\s[:punct:]]+s(?P<season>\d{1,2})[\s[:punct:]]*e(?P<episode>\d{1,3})(?:\D|$)"),
        compile(r"(?i)^(?P<show>.+?)[\s[:punct:]]+\[?(?P<season>\d{1,2})x(?P<episode>\d{1,3})\]?(?:\D|$)"),
        compile(
            r"(?i)^(?P<show>.+?)[\s[:punct:]]+season[\s[:punct:]]*(?P<season>\d{1,2})[\s[:punct:]]*episode[\s[:punct:]]*(?P<episode>\d{1,3})(?:\D|$)",
        ),
    ]
});

/// Show, season and episode from a name like `Show.S01E02.720p`
pub(crate) fn parse_episode_name(text: &str, file: &str) -> Option<SearchInfo> {
    let caps = EPISODE_PATTERNS.iter().find_map(|re| re.captures(text))?;
    let (name, year, country) = split_show_name(caps.name("show")?.as_str());
    if name.is_empty() {
        return None;
    }
    let season = number_or_zero(caps.name("season"));
    let episode = number_or_zero(caps.name("episode"));
    Some(SearchInfo::tv_show(file, name, season, episode).with_show_details(year, country))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TvShowMatcher;

impl InputMatcher for TvShowMatcher {
    fn name(&self) -> &'static str {
        "TvShowMatcher"
    }

    fn matches_file_input(&self, file: &str, simplified: &str) -> bool {
        self.file_input_match(file, simplified).is_some()
    }

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo> {
        parse_episode_name(uri::file_name(simplified), file)
    }

    fn matches_user_input(&self, input: &str) -> bool {
        self.user_input_match(input, "").is_some()
    }

    fn user_input_match(&self, input: &str, file: &str) -> Option<SearchInfo> {
        parse_episode_name(input.trim(), file)
    }
}
