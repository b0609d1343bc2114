//! Filename extraction from URL path.

/// Returns the text after the final `/` of the URL path (like a POSIX basename
/// that does not strip trailing slashes).
///
/// Returns `None` if the URL cannot be parsed or the final segment is empty.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}
