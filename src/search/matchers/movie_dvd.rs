//! Ripped DVD structure: `<Title>/VIDEO_TS/VIDEO_TS.VOB` or `VTS_nn_n.VOB`.
//! The title folder name usually needs the same cleanup as a release name, so
//! the result is flagged for a forced reparse.

use std::sync::LazyLock;

use regex::Regex;

use super::InputMatcher;
use crate::search::clean::compile;
use crate::search::info::SearchInfo;

static DVD_FILE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(?:^|/)(?P<name>[^/]+)/VIDEO_TS/(?:VIDEO_TS|VTS_\d{2}_\d{1,2})\.VOB$")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MovieDvdMatcher;

impl InputMatcher for MovieDvdMatcher {
    fn name(&self) -> &'static str {
        "MovieDvdMatcher"
    }

    fn matches_file_input(&self, file: &str, simplified: &str) -> bool {
        self.file_input_match(file, simplified).is_some()
    }

    fn file_input_match(&self, file: &str, _simplified: &str) -> Option<SearchInfo> {
        let caps = DVD_FILE.captures(file)?;
        let name = caps.name("name")?.as_str().trim();
        if name.is_empty() || name.ends_with(':') {
            return None;
        }
        Some(SearchInfo::movie(file, name, None).with_force_reparse(true))
    }

    fn matches_user_input(&self, _input: &str) -> bool {
        false
    }

    fn user_input_match(&self, _input: &str, _file: &str) -> Option<SearchInfo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvd_structure() {
        let m = MovieDvdMatcher;
        let info = m.file_input_match("/dvd/Alien.1979/VIDEO_TS/VTS_01_1.VOB", "").unwrap();
        assert_eq!(info.as_movie().unwrap().title, "Alien.1979");
        assert!(info.force_reparse());
        assert!(m.matches_file_input("smb://nas/Heat/video_ts/video_ts.vob", ""));
    }

    #[test]
    fn test_needs_named_parent_and_video_ts() {
        let m = MovieDvdMatcher;
        assert!(!m.matches_file_input("/x/y/VTS_01_1.VOB", "/x/y/VTS_01_1"));
        assert!(!m.matches_file_input("/VIDEO_TS/VTS_01_1.VOB", "/VIDEO_TS/VTS_01_1"));
        assert!(!m.matches_file_input("/x/VIDEO_TS/VTS_01_1.avi", "/x/VIDEO_TS/VTS_01_1"));
        assert!(!m.matches_user_input("/x/VIDEO_TS/VTS_01_1.VOB"));
    }
}
