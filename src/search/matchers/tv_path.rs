//! TV episode from a `/<Show>/Season <N>/<file>` folder layout. The episode
//! number comes from an `ep3`/`e03`/`episode 3` marker in the file name, or 0.

use std::sync::LazyLock;

use regex::Regex;

use super::{InputMatcher, number_or_zero};
use crate::search::clean::{compile, split_show_name};
use crate::search::info::SearchInfo;

static SEASON_PATH: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:^|/)(?P<show>[^/]+)/season[\s[:punct:]]*(?P<season>\d{1,2})/(?P<name>[^/]+)$")
});
static EPISODE_IN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:^|[^a-z])(?:episode|ep|e)[\s[:punct:]]*(?P<episode>\d{1,3})(?:\D|$)|^(?P<number>\d{1,3})(?:\D|$)")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct TvShowPathMatcher;

impl TvShowPathMatcher {
    fn parse(file: &str, simplified: &str) -> Option<SearchInfo> {
        let caps = SEASON_PATH.captures(simplified)?;
        let (show, year, country) = split_show_name(caps.name("show")?.as_str());
        if show.is_empty() {
            return None;
        }
        let season = number_or_zero(caps.name("season"));
        let episode = caps
            .name("name")
            .and_then(|name| EPISODE_IN_NAME.captures(name.as_str()))
            .map(|ep| number_or_zero(ep.name("episode").or_else(|| ep.name("number"))))
            .unwrap_or(0);
        Some(SearchInfo::tv_show(file, show, season, episode).with_show_details(year, country))
    }
}

impl InputMatcher for TvShowPathMatcher {
    fn name(&self) -> &'static str {
        "TvShowPathMatcher"
    }

    fn matches_file_input(&self, file: &str, simplified: &str) -> bool {
        Self::parse(file, simplified).is_some()
    }

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo> {
        Self::parse(file, simplified)
    }

    fn matches_user_input(&self, _input: &str) -> bool {
        false
    }

    fn user_input_match(&self, _input: &str, _file: &str) -> Option<SearchInfo> {
        None
    }
}
