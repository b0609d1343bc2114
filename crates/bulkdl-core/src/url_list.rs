//! Newline-delimited URL list input.

use anyhow::{Context, Result};
use std::path::Path;

/// One URL per line; surrounding whitespace trimmed, blank lines skipped.
/// No comment syntax and no deduplication: repeated lines are returned repeatedly.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read URL list: {}", path.display()))?;
    Ok(parse_url_list(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_blank_lines_and_trims() {
        let urls = parse_url_list("https://a/1\n\n   \n  https://a/2  \r\nhttps://a/3");
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://a/3"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let urls = parse_url_list("https://a/x\nhttps://a/x\n");
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn reads_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "https://example.com/a.zim").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "https://example.com/b.zim").unwrap();
        let urls = read_url_list(f.path()).unwrap();
        assert_eq!(urls, vec!["https://example.com/a.zim", "https://example.com/b.zim"]);
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_url_list(&dir.path().join("nope.txt")).is_err());
    }
}
