//! Incremental parsing of response header lines as curl delivers them.

/// Head of the most recent response seen on a transfer. Redirect hops and
/// interim responses each start with a status line, which resets the state,
/// so after the transfer this describes the final response only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ResponseHead {
    pub status: u32,
    pub content_length: Option<u64>,
    /// Complete length from `Content-Range` (`bytes a-b/N` or `bytes */N`).
    pub content_range_total: Option<u64>,
}

impl ResponseHead {
    /// Feed one raw header line (status line included).
    pub fn observe(&mut self, raw: &[u8]) {
        let Ok(line) = std::str::from_utf8(raw) else {
            return;
        };
        let line = line.trim();
        if line.starts_with("HTTP/") {
            *self = ResponseHead {
                status: parse_status_line(line).unwrap_or(0),
                ..ResponseHead::default()
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                self.content_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("content-range") {
                self.content_range_total = parse_content_range_total(value);
            }
        }
    }
}

/// `HTTP/1.1 206 Partial Content` → 206; `HTTP/2 200` → 200.
pub(super) fn parse_status_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// `bytes 100-199/1000` → 1000; `bytes */1000` → 1000; `bytes 0-9/*` → None.
pub(super) fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
