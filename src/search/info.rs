//! Parsed media identity: what a file (or the user) is believed to be
//!
//! A `SearchInfo` carries provenance (the file it came from, an optional user
//! override, a force-reparse flag) and either movie or TV show details. The
//! search suggestion derived from those details is computed once and memoized.

use std::fmt;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Movie identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInfo {
    pub title: String,
    /// Four-digit release year, when one was found
    pub year: Option<String>,
}

/// TV episode identity. Season/episode are 0 when the show matched but the
/// numbers could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvShowInfo {
    pub show_name: String,
    pub season: u32,
    pub episode: u32,
    pub first_aired_year: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Movie(MovieInfo),
    TvShow(TvShowInfo),
}

impl Media {
    fn suggestion(&self) -> String {
        match self {
            Media::Movie(m) => match &m.year {
                Some(year) => format!("{} {}", m.title, year),
                None => m.title.clone(),
            },
            Media::TvShow(t) => format!("{} S{:02}E{:02}", t.show_name, t.season, t.episode),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchInfo {
    file: String,
    user_input: String,
    force_reparse: bool,
    media: Media,
    suggestion: OnceCell<String>,
}

impl SearchInfo {
    pub fn new(file: impl Into<String>, media: Media) -> Self {
        Self {
            file: file.into(),
            user_input: String::new(),
            force_reparse: false,
            media,
            suggestion: OnceCell::new(),
        }
    }

    pub fn movie(file: impl Into<String>, title: impl Into<String>, year: Option<String>) -> Self {
        Self::new(
            file,
            Media::Movie(MovieInfo {
                title: title.into(),
                year,
            }),
        )
    }

    pub fn tv_show(file: impl Into<String>, show_name: impl Into<String>, season: u32, episode: u32) -> Self {
        Self::new(
            file,
            Media::TvShow(TvShowInfo {
                show_name: show_name.into(),
                season,
                episode,
                first_aired_year: None,
                country: None,
            }),
        )
    }

    /// Attach free text the user typed to override the guess
    pub fn with_user_input(mut self, input: impl Into<String>) -> Self {
        self.user_input = input.into();
        self
    }

    pub fn with_force_reparse(mut self, force: bool) -> Self {
        self.force_reparse = force;
        self
    }

    /// Set first-aired year and country on a TV show; no-op for movies
    pub fn with_show_details(mut self, first_aired_year: Option<String>, country: Option<String>) -> Self {
        if let Media::TvShow(t) = &mut self.media {
            t.first_aired_year = first_aired_year;
            t.country = country;
            self.suggestion = OnceCell::new();
        }
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn force_reparse(&self) -> bool {
        self.force_reparse
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn as_movie(&self) -> Option<&MovieInfo> {
        match &self.media {
            Media::Movie(m) => Some(m),
            Media::TvShow(_) => None,
        }
    }

    pub fn as_tv_show(&self) -> Option<&TvShowInfo> {
        match &self.media {
            Media::TvShow(t) => Some(t),
            Media::Movie(_) => None,
        }
    }

    pub fn is_movie(&self) -> bool {
        matches!(self.media, Media::Movie(_))
    }

    pub fn is_tv_show(&self) -> bool {
        matches!(self.media, Media::TvShow(_))
    }

    /// Text a scraper would search for; computed once
    pub fn suggestion(&self) -> &str {
        self.suggestion.get_or_init(|| self.media.suggestion())
    }

    /// Forced, or the user typed something other than what we'd suggest
    pub fn needs_reparse(&self) -> bool {
        self.force_reparse || (!self.user_input.is_empty() && self.user_input != self.suggestion())
    }

    /// User input when present, else the suggestion
    pub fn effective_input(&self) -> &str {
        if self.user_input.is_empty() {
            self.suggestion()
        } else {
            &self.user_input
        }
    }
}

// The memoized suggestion is derived state and never part of equality
impl PartialEq for SearchInfo {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
            && self.user_input == other.user_input
            && self.force_reparse == other.force_reparse
            && self.media == other.media
    }
}

impl Eq for SearchInfo {}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.media {
            Media::Movie(m) => {
                write!(f, "Movie: {}", m.title)?;
                if let Some(year) = &m.year {
                    write!(f, " ({})", year)?;
                }
            }
            Media::TvShow(t) => {
                write!(f, "TV: {} S{:02}E{:02}", t.show_name, t.season, t.episode)?;
                if let Some(year) = &t.first_aired_year {
                    write!(f, " [{}]", year)?;
                }
                if let Some(country) = &t.country {
                    write!(f, " [{}]", country)?;
                }
            }
        }
        Ok(())
    }
}
