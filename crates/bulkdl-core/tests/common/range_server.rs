//! Minimal HTTP/1.1 server with Range support for integration tests.
//!
//! Serves the same static body at every path, one request per connection
//! (`Connection: close`). GET with `Range: bytes=X-` answers 206, or 416 with
//! `Content-Range: bytes */N` when X is at or past the end. Every request is
//! recorded so tests can assert on what the client actually asked for.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// Requests whose path starts with this prefix get `500 Internal Server Error`.
    pub fail_prefix: Option<&'static str>,
    /// The first N requests (any path) get `500 Internal Server Error`.
    pub fail_first: usize,
    /// The first successful response advertises its full length but the
    /// connection is closed after this many body bytes.
    pub truncate_first_at: Option<usize>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            fail_prefix: None,
            fail_first: 0,
            truncate_first_at: None,
        }
    }
}

/// One request as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    /// Raw `Range` header value, e.g. `bytes=100-`.
    pub range: Option<String>,
}

struct ServerState {
    body: Vec<u8>,
    opts: RangeServerOptions,
    requests: Mutex<Vec<RecordedRequest>>,
    served: AtomicUsize,
    truncated: AtomicUsize,
}

/// Handle to a running server. The server thread runs until the process exits.
pub struct RangeServer {
    base: String,
    state: Arc<ServerState>,
}

impl RangeServer {
    /// URL for `path` (no leading slash), e.g. `url("a/file.bin")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Range headers of requests for `path`, in arrival order.
    pub fn ranges_for(&self, path: &str) -> Vec<Option<String>> {
        let want = format!("/{}", path);
        self.requests()
            .into_iter()
            .filter(|r| r.path == want)
            .map(|r| r.range)
            .collect()
    }
}

/// Starts a server in a background thread serving `body`.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior (failures, truncation, no ranges).
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(ServerState {
        body,
        opts,
        requests: Mutex::new(Vec::new()),
        served: AtomicUsize::new(0),
        truncated: AtomicUsize::new(0),
    });
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    RangeServer {
        base: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8(data).ok()
}

fn handle(mut stream: TcpStream, state: &ServerState) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let (method, path, range_raw) = parse_request(&request);
    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        range: range_raw.clone(),
    });
    let seq = state.served.fetch_add(1, Ordering::SeqCst);

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    let failing_path = state
        .opts
        .fail_prefix
        .map_or(false, |p| path.starts_with(p));
    if failing_path || seq < state.opts.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\nerror",
        );
        return;
    }

    let body = state.body.as_slice();
    let total = body.len() as u64;
    let range = range_raw.as_deref().and_then(parse_range);
    let (status, content_range, slice) = match range {
        Some((start, end_incl)) if state.opts.support_ranges => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if total == 0 || start > end_incl {
                (
                    "416 Range Not Satisfiable",
                    format!("bytes */{}", total),
                    &body[0..0],
                )
            } else {
                let slice = &body[start as usize..=end_incl as usize];
                (
                    "206 Partial Content",
                    format!("bytes {}-{}/{}", start, end_incl, total),
                    slice,
                )
            }
        }
        _ => (
            "200 OK",
            format!("bytes 0-{}/{}", total.saturating_sub(1), total),
            body,
        ),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Range: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len(),
        content_range
    );
    let _ = stream.write_all(response.as_bytes());

    if let Some(cut) = state.opts.truncate_first_at {
        if !slice.is_empty() && state.truncated.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = stream.write_all(&slice[..cut.min(slice.len())]);
            let _ = stream.flush();
            let _ = stream.shutdown(std::net::Shutdown::Both);
            return;
        }
    }
    let _ = stream.write_all(slice);
}

/// Returns (method, path, raw Range header value).
fn parse_request(request: &str) -> (String, String, Option<String>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("/").to_string();
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    (method, path, range)
}

/// `bytes=X-Y` → (X, Y); `bytes=X-` → (X, u64::MAX).
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (a, b) = spec.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = b.trim();
    let end_incl = if end.is_empty() {
        u64::MAX
    } else {
        end.parse::<u64>().ok()?
    };
    Some((start, end_incl))
}

/// Accepts connections and reads requests but never answers. Returns the base
/// URL and a counter of accepted connections.
pub fn start_silent() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::spawn(move || {
                // Hold the connection open until the client gives up.
                let mut buf = [0u8; 4096];
                while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
            });
        }
    });
    (format!("http://127.0.0.1:{}/", port), accepted)
}
