//! Title cleanup shared by the matchers: separators, years, brackets and
//! release-tag junk.

use std::sync::LazyLock;

use regex::Regex;

/// Compile a pattern literal. Patterns are fixed at build time, so failure is
/// a defect in this module.
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {:?}: {}", pattern, e))
}

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| compile(r"\d+"));
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| compile(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}"));
static NUMBERING: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*\d{1,3}\s*[.)\-]\s+"));
static DOT_JOIN: LazyLock<Regex> = LazyLock::new(|| compile(r"\.(\S)"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));
static SHOW_YEAR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?P<name>.+?)[\s[:punct:]]+\(?(?P<year>(?:19|20)\d{2})\)?$"));
static SHOW_COUNTRY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?P<name>.+?)[\s[:punct:]]+\(?(?P<country>US|UK|GB|AU|NZ|CA|IE)\)?$"));

/// Release tags that are only junk in this exact spelling; `Real` or `Proper`
/// inside a title are left alone.
const CASE_SENSITIVE_JUNK: &[&str] = &[
    "REAL", "PROPER", "REPACK", "RERIP", "LIMITED", "iNTERNAL", "INTERNAL", "DUBBED", "SUBBED", "DiRECTORS", "DC",
    "TS", "TC", "CAM", "R5", "SCR", "DVDSCR", "WS", "FS", "PAL", "NTSC", "MULTi", "MULTI", "NFO",
];

/// Resolution, codec and source tags in any case
const CASE_INSENSITIVE_JUNK: &[&str] = &[
    "2160p", "1080p", "1080i", "720p", "576p", "480p", "4k", "uhd", "x264", "x265", "h264", "h.264", "h265",
    "h.265", "hevc", "xvid", "divx", "avc", "bluray", "blu-ray", "bdrip", "brrip", "bdremux", "remux", "dvdrip",
    "dvdr", "dvd", "hdrip", "hdtv", "webrip", "web-dl", "webdl", "hdcam", "ac3", "dts", "aac", "dd5.1",
    "5.1",
];

fn junk_pattern(tokens: &[&str], case_insensitive: bool) -> Regex {
    let alternatives = tokens.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    let flags = if case_insensitive { "(?i)" } else { "" };
    compile(&format!(r"{}(?:^|[\s[:punct:]])(?:{})(?:[\s[:punct:]]|$)", flags, alternatives))
}

static JUNK_SENSITIVE: LazyLock<Regex> = LazyLock::new(|| junk_pattern(CASE_SENSITIVE_JUNK, false));
static JUNK_INSENSITIVE: LazyLock<Regex> = LazyLock::new(|| junk_pattern(CASE_INSENSITIVE_JUNK, true));

fn is_trim_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | '.' | ',' | ':' | ';' | '(' | '[' | '{' | '+' | '~' | '#' | '|' | '*' | '/')
}

/// Strip separators and dangling openers from both ends
pub fn trim_junk(text: &str) -> &str {
    text.trim_matches(is_trim_char)
}

/// Turn a filename fragment into a readable title: `_` and joined dots become
/// spaces, whitespace collapses, ends are trimmed. `Mr. Nobody` keeps its dot.
pub fn clean_up_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let spaced = DOT_JOIN.replace_all(&spaced, " $1");
    let collapsed = SPACES.replace_all(&spaced, " ");
    trim_junk(&collapsed).to_string()
}

/// Drop a leading list number such as `1. ` or `07 - `
pub fn strip_numbering(text: &str) -> &str {
    match NUMBERING.find(text) {
        Some(m) if m.end() < text.len() => &text[m.end()..],
        _ => text,
    }
}

/// Remove `[...]`, `(...)` and `{...}` groups
pub fn remove_bracketed(text: &str) -> String {
    BRACKETED.replace_all(text, " ").into_owned()
}

/// Byte range of the last standalone 1900-2099 number. Digits touching it
/// on either side disqualify it (`12001` is not a year).
pub fn last_year(text: &str) -> Option<(usize, usize)> {
    DIGIT_RUN
        .find_iter(text)
        .filter(|m| m.as_str().len() == 4)
        .filter(|m| m.as_str().parse::<u32>().is_ok_and(|y| (1900..=2099).contains(&y)))
        .last()
        .map(|m| (m.start(), m.end()))
}

/// Earliest junk match that leaves a non-empty title in front of it
fn first_cut(text: &str, junk: &Regex) -> Option<usize> {
    junk.find_iter(text)
        .map(|m| m.start())
        .find(|&start| !trim_junk(&text[..start]).is_empty())
}

/// Cut `text` at the first release tag: case-sensitive list first, then the
/// case-insensitive one. The leftmost segment is assumed to be the title.
pub fn cut_junk(text: &str) -> &str {
    let mut out = text;
    if let Some(cut) = first_cut(out, &JUNK_SENSITIVE) {
        out = &out[..cut];
    }
    if let Some(cut) = first_cut(out, &JUNK_INSENSITIVE) {
        out = &out[..cut];
    }
    out
}

/// Cleaned show name with optional trailing first-aired year and country tag:
/// `Doctor Who (2005)` -> (`Doctor Who`, 2005), `The Office US` -> (`The Office`, US).
pub fn split_show_name(raw: &str) -> (String, Option<String>, Option<String>) {
    let mut name = clean_up_name(raw);
    let mut year = None;
    let mut country = None;

    // Either order: "Show (2005) (US)" or "Show US 2005"
    for _ in 0..2 {
        if country.is_none() {
            if let Some(caps) = SHOW_COUNTRY.captures(&name) {
                country = Some(caps["country"].to_string());
                name = trim_junk(&caps["name"]).to_string();
                continue;
            }
        }
        if year.is_none() {
            if let Some(caps) = SHOW_YEAR.captures(&name) {
                year = Some(caps["year"].to_string());
                name = trim_junk(&caps["name"]).to_string();
            }
        }
    }
    (name, year, country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_up_name() {
        assert_eq!(clean_up_name("The.Movie.Name"), "The Movie Name");
        assert_eq!(clean_up_name("Starship_Troopers_"), "Starship Troopers");
        assert_eq!(clean_up_name("  Mr. Nobody - "), "Mr. Nobody");
        assert_eq!(clean_up_name("a__b"), "a b");
    }

    #[test]
    fn test_strip_numbering() {
        assert_eq!(strip_numbering("100. [DVD]Starship"), "[DVD]Starship");
        assert_eq!(strip_numbering("07 - Title"), "Title");
        assert_eq!(strip_numbering("2001 A Space Odyssey"), "2001 A Space Odyssey");
        assert_eq!(strip_numbering("9 to 5"), "9 to 5");
    }

    #[test]
    fn test_last_year() {
        let text = "Blade Runner 1982 x264-TEAM2049";
        let (s, e) = last_year(text).unwrap();
        assert_eq!(&text[s..e], "2049");
        assert!(last_year("Movie 12001 3000").is_none());
        assert!(last_year("x264 1080p").is_none());
        let text = "Alien_1979.DVDRip";
        let (s, e) = last_year(text).unwrap();
        assert_eq!(&text[s..e], "1979");
    }

    #[test]
    fn test_cut_junk_respects_bounds_and_case() {
        assert_eq!(cut_junk("The Real McCoy"), "The Real McCoy");
        assert_eq!(cut_junk("Some Movie REAL PROPER x264"), "Some Movie");
        assert_eq!(cut_junk("Some Movie 720p x264"), "Some Movie");
        assert_eq!(cut_junk("Some Movie.-HDrip--IT"), "Some Movie.");
        assert_eq!(cut_junk("Charlotte's Web"), "Charlotte's Web");
        assert_eq!(cut_junk("Heat Extended Family"), "Heat Extended Family");
        assert_eq!(cut_junk("The Uncut Gems DVDRip"), "The Uncut Gems");
        // Never cut away the whole title
        assert_eq!(cut_junk("DVD"), "DVD");
        assert_eq!(cut_junk("Proper Title"), "Proper Title");
    }

    #[test]
    fn test_remove_bracketed() {
        assert_eq!(trim_junk(&remove_bracketed("[DVD]Movie (Extended) {x}")), "Movie");
    }

    #[test]
    fn test_split_show_name() {
        assert_eq!(split_show_name("Doctor.Who.(2005)"), ("Doctor Who".to_string(), Some("2005".to_string()), None));
        assert_eq!(split_show_name("The.Office.US"), ("The Office".to_string(), None, Some("US".to_string())));
        assert_eq!(
            split_show_name("Shameless (US) (2011)"),
            ("Shameless".to_string(), Some("2011".to_string()), Some("US".to_string()))
        );
        assert_eq!(split_show_name("Galactica"), ("Galactica".to_string(), None, None));
    }
}
