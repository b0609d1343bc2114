//! URL modeling and filename derivation.
//!
//! A URL maps to exactly one local filename, computed from the URL text alone
//! so the same URL lands on the same path in every run (required for resume).

mod path;
mod sanitize;

use sha2::{Digest, Sha256};

pub use path::last_path_segment;
pub use sanitize::sanitize_filename;

/// Prefix for names derived from a hash when the URL has no usable path segment.
const FALLBACK_PREFIX: &str = "unnamed_file_";

/// Number of hex characters of the URL digest kept in fallback names.
const FALLBACK_HASH_LEN: usize = 8;

/// Derives the local filename for `url`.
///
/// Uses the last path segment (query and fragment ignored). When that segment
/// is empty (`https://example.com/`, `https://example.com/dir/`) or unusable
/// after sanitizing, falls back to `unnamed_file_<first 8 hex of SHA-256(url)>`.
///
/// # Examples
///
/// - `derive_filename("https://example.com/archive.zip")` → `"archive.zip"`
/// - `derive_filename("https://example.com/")` → `"unnamed_file_…"` (stable per URL)
pub fn derive_filename(url: &str) -> String {
    last_path_segment(url)
        .map(|s| sanitize_filename(&s))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| fallback_filename(url))
}

/// Hash-derived name for URLs without a path segment.
pub fn fallback_filename(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{}{}", FALLBACK_PREFIX, &digest[..FALLBACK_HASH_LEN])
}
