//! Catch-all movie matcher. Always matches.
//!
//! 1. drop leading list numbering (`1. `)
//! 2. take the *last* standalone 1900-2099 number as the year and cut there
//! 3. remove bracketed groups
//! 4. cut at the first release tag (case-sensitive list, then case-insensitive)
//!
//! The last year wins even when the title itself ends in a year-like number or
//! a release group carries one; see `test_last_year_wins`.

use log::debug;

use super::InputMatcher;
use crate::search::clean::{clean_up_name, cut_junk, last_year, remove_bracketed, strip_numbering, trim_junk};
use crate::search::info::SearchInfo;
use crate::search::uri;

#[derive(Debug, Default, Clone, Copy)]
pub struct MovieDefaultMatcher;

impl MovieDefaultMatcher {
    fn parse(text: &str, file: &str) -> SearchInfo {
        let text = strip_numbering(text.trim());

        let (rest, year) = match last_year(text) {
            Some((start, end)) => {
                let year = text[start..end].to_string();
                let left = &text[..start];
                // Year in front: the title follows it
                let rest = if trim_junk(left).is_empty() { &text[end..] } else { left };
                (rest, Some(year))
            }
            None => (text, None),
        };

        let unbracketed = remove_bracketed(rest);
        let title = clean_up_name(cut_junk(&unbracketed));
        if !title.is_empty() {
            return SearchInfo::movie(file, title, year);
        }
        // Nothing left but the year or junk
        if let Some(year) = year {
            return SearchInfo::movie(file, year, None);
        }
        let title = clean_up_name(text);
        if !title.is_empty() {
            return SearchInfo::movie(file, title, None);
        }
        SearchInfo::movie(file, Self::fallback_title(file), None)
    }

    /// Title for separator-only input: the file name, then its folder
    fn fallback_title(file: &str) -> String {
        let name = clean_up_name(uri::file_name(uri::strip_extension(file)));
        if !name.is_empty() {
            return name;
        }
        let folder = uri::parent_name(file).map(clean_up_name).unwrap_or_default();
        if folder.is_empty() {
            debug!("No usable title in {:?}", file);
        }
        folder
    }
}

impl InputMatcher for MovieDefaultMatcher {
    fn name(&self) -> &'static str {
        "MovieDefaultMatcher"
    }

    fn matches_file_input(&self, _file: &str, _simplified: &str) -> bool {
        true
    }

    fn file_input_match(&self, file: &str, simplified: &str) -> Option<SearchInfo> {
        Some(Self::parse(uri::file_name(simplified), file))
    }

    fn matches_user_input(&self, _input: &str) -> bool {
        true
    }

    fn user_input_match(&self, input: &str, file: &str) -> Option<SearchInfo> {
        Some(Self::parse(input, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (String, Option<String>) {
        let info = MovieDefaultMatcher.user_input_match(text, "/f.avi").unwrap();
        let m = info.as_movie().unwrap();
        (m.title.clone(), m.year.clone())
    }

    #[test]
    fn test_numbered_bracketed_junk() {
        assert_eq!(
            parse("100. [DVD]Starship_Troopers_1995.-HDrip--IT"),
            ("Starship Troopers".into(), Some("1995".into()))
        );
        assert_eq!(parse("Heat [1080p] x264"), ("Heat".into(), None));
        assert_eq!(parse("The Real McCoy DVDRip"), ("The Real McCoy".into(), None));
    }

    #[test]
    fn test_last_year_wins() {
        // Release group carries a year-like number: it is taken as the year
        assert_eq!(
            parse("Blade Runner 1982 x264-TEAM2049"),
            ("Blade Runner 1982".into(), Some("2049".into()))
        );
        assert_eq!(parse("2012 (2009)"), ("2012".into(), Some("2009".into())));
    }

    #[test]
    fn test_year_first_and_degenerate_input() {
        assert_eq!(parse("1995 Some Movie"), ("Some Movie".into(), Some("1995".into())));
        assert_eq!(parse("1917"), ("1917".into(), None));
        assert_eq!(parse("Titanic"), ("Titanic".into(), None));
        assert!(MovieDefaultMatcher.matches_user_input(""));
        assert!(MovieDefaultMatcher.matches_file_input("", ""));
    }

    #[test]
    fn test_blank_input_falls_back_to_file_then_folder() {
        let info = MovieDefaultMatcher.user_input_match("  ", "/dl/Heat.avi").unwrap();
        assert_eq!(info.as_movie().unwrap().title, "Heat");
        assert_eq!(info.suggestion(), "Heat");

        let info = MovieDefaultMatcher.file_input_match("/dl/   .avi", "/dl/   ").unwrap();
        assert_eq!(info.as_movie().unwrap().title, "dl");

        let info = MovieDefaultMatcher.user_input_match(" . - ", "").unwrap();
        assert_eq!(info.as_movie().unwrap().title, "");
    }
}
