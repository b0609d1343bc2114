//! Filesystem-safe filename cleanup.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Makes a path segment safe to join onto the download directory.
///
/// Replaces NUL, `/`, `\` and control characters with `_` and truncates to
/// 255 bytes on a char boundary. Everything else (spaces, leading dots,
/// percent escapes) is kept so names stay recognisable.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.len() <= NAME_MAX {
        return cleaned;
    }
    let mut take = NAME_MAX;
    while !cleaned.is_char_boundary(take) {
        take -= 1;
    }
    cleaned[..take].to_string()
}
