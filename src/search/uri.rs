//! Slash-separated URI helpers shared by the matchers
//!
//! Matchers see URIs as plain strings (`/movies/Titanic (1997)/movie.avi`,
//! `smb://nas/share/...`); only `/` separates components.

/// Last path component
pub fn file_name(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Name of the folder holding the last component, if any.
/// `/x/movie.avi` -> `Some("x")`, `movie.avi` -> `None`.
pub fn parent_name(uri: &str) -> Option<&str> {
    let trimmed = uri.trim_end_matches('/');
    let idx = trimmed.rfind('/')?;
    let parent = file_name(&trimmed[..idx]);
    if parent.is_empty() || parent.ends_with(':') {
        None
    } else {
        Some(parent)
    }
}

/// Extension of the last component: 1-5 ASCII alphanumerics after the last dot.
/// `Mr. Nobody` has none; `movie.mkv` has `mkv`.
pub fn extension(uri: &str) -> Option<&str> {
    let name = file_name(uri);
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    let valid = dot > 0 && (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// URI with the extension of its last component removed
pub fn strip_extension(uri: &str) -> &str {
    match extension(uri) {
        Some(ext) => &uri[..uri.len() - ext.len() - 1],
        None => uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        assert_eq!(file_name("/movies/Titanic (1997)/movie.avi"), "movie.avi");
        assert_eq!(file_name("movie.avi"), "movie.avi");
        assert_eq!(parent_name("/movies/Titanic (1997)/movie.avi"), Some("Titanic (1997)"));
        assert_eq!(parent_name("/movie.avi"), None);
        assert_eq!(parent_name("movie.avi"), None);
        assert_eq!(parent_name("smb://nas/movie.avi"), Some("nas"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/a/b/movie.mkv"), Some("mkv"));
        assert_eq!(extension("/a/Mr. Nobody"), None);
        assert_eq!(extension("/a.dir/file"), None);
        assert_eq!(extension("/a/.hidden"), None);
        assert_eq!(extension("The.Movie.2011.x264-GRP"), None);
        assert_eq!(strip_extension("/a/b/The.Movie.2011.mkv"), "/a/b/The.Movie.2011");
        assert_eq!(strip_extension("/a/b/noext"), "/a/b/noext");
    }
}
