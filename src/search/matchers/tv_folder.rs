//! TV episode whose show (and usually season) lives in the parent folder:
//! `Galactica S01/E03 - Pilot.avi` or `Firefly/S01E02.avi`.

use std::sync::LazyLock;

use regex::Regex;

use super::{InputMatcher, number_or_zero};
use crate::search::clean::{compile, split_show_name};
use crate::search::info::SearchInfo;
use crate::search::uri;

static SEASON_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)^(?P<show>.+?)[\s[:punct:]]+(?:s|season[\s[:punct:]]*)(?P<season>\d{1,2})(?:[\s[:punct:]].*)?$")
});
static BARE_SEASON_FOLDER: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^season[\s[:punct:]]*\d+$"));
static SXXEYY_NAME: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^s(?P<season>\d{1,2})[\s[:punct:]]*e(?P<episode>\d{1,3})(?:\D|$)"));
static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:^|[\s[:punct:]])(?:episode|ep|e)[\s[:punct:]]*(?P<episode>\d{1,3})(?:\D|$)|^(?P<number>\d{1,3})(?:[\s[:punct:]]|$)")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct TvShowFolderMatcher;

impl TvShowFolderMatcher {
    fn parse(file: &str, simplified: &str) -> Option<SearchInfo> {
        let parent = uri::parent_name(simplified)?;
        let name = uri::file_name(simplified);
        let season_folder = SEASON_FOLDER.captures(parent);

        let (raw_show, season, episode) = if let Some(caps) = SXXEYY_NAME.captures(name) {
            let show = match &season_folder {
                Some(folder) => folder.name("show")?.as_str(),
                None if BARE_SEASON_FOLDER.is_match(parent) => return None,
                None => parent,
            };
            (show, number_or_zero(caps.name("season")), number_or_zero(caps.name("episode")))
        } else {
            let folder = season_folder?;
            let marker = EPISODE_MARKER.captures(name)?;
            let episode = number_or_zero(marker.name("episode").or_else(|| marker.name("number")));
            (folder.name("show")?.as_str(), number_or_zero(folder.name("season")), episode)
        };

        let (show, year, country) = split_show_name(raw_show);
        if show.is_empty() {
            return None;
        }
        Some(SearchInfo::tv_show(file, show, season, episode).with_show_details(year, country))
    }
}

impl InputMatcher for TvShowFolderMatcher {
    fn name(&self) -> &'static str {
        "TvShowFolderMatcher"
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
