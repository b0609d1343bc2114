//! One HTTP GET attempt: optional `Range: bytes=<offset>-`, body streamed
//! chunk by chunk into a `FileSink`.

use std::cell::RefCell;
use std::io;
use std::path::Path;

use super::headers::ResponseHead;
use super::TransferOptions;
use crate::progress::ProgressObserver;
use crate::retry::FetchError;
use crate::storage::FileSink;

/// Where one attempt writes and whom it tells.
pub(super) struct Target<'a> {
    pub url: &'a str,
    pub path: &'a Path,
    pub filename: &'a str,
    pub progress: &'a dyn ProgressObserver,
}

/// Body consumer shared by the curl header and write callbacks.
struct BodySink<'a> {
    target: &'a Target<'a>,
    sink: FileSink,
    head: ResponseHead,
    offset: u64,
    started: bool,
    received: u64,
    storage_error: Option<io::Error>,
}

impl BodySink<'_> {
    fn accept(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.head.status >= 400 {
            // Error page body; never lands in the target file.
            return Ok(());
        }
        if !self.started {
            self.begin()?;
        }
        self.sink.write_chunk(chunk)?;
        self.received += chunk.len() as u64;
        self.target.progress.advanced(self.target.url, self.sink.len());
        Ok(())
    }

    fn begin(&mut self) -> io::Result<()> {
        self.started = true;
        if self.offset > 0 && self.head.status != 206 {
            tracing::debug!(
                offset = self.offset,
                status = self.head.status,
                "server ignored range request; rewriting from 0"
            );
            self.sink.restart()?;
        }
        let initial = self.sink.len();
        let total = self.head.content_length.map(|len| len + initial);
        self.target
            .progress
            .started(self.target.url, self.target.filename, initial, total);
        Ok(())
    }
}

/// Runs one GET for `target.url`, resuming at `offset` (0 = fresh file).
/// Returns the file length after a complete response.
pub(super) fn fetch_once(
    target: &Target<'_>,
    offset: u64,
    options: &TransferOptions,
) -> Result<u64, FetchError> {
    let sink = if offset > 0 {
        FileSink::append(target.path)
    } else {
        FileSink::create(target.path)
    }
    .map_err(FetchError::Storage)?;

    let mut easy = curl::easy::Easy::new();
    easy.url(target.url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(options.timeout)?;
    // Read timeout: give up when the body stalls (< 1 byte/s) for the whole window.
    easy.low_speed_limit(1)?;
    easy.low_speed_time(options.timeout)?;
    easy.buffer_size(options.chunk_size)?;
    if offset > 0 {
        easy.range(&format!("{}-", offset))?;
    }

    let body = RefCell::new(BodySink {
        target,
        sink,
        head: ResponseHead::default(),
        offset,
        started: false,
        received: 0,
        storage_error: None,
    });

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            body.borrow_mut().head.observe(line);
            true
        })?;
        transfer.write_function(|chunk| {
            let mut body = body.borrow_mut();
            match body.accept(chunk) {
                Ok(()) => Ok(chunk.len()),
                Err(e) => {
                    // Returning a short count makes curl abort with a write error.
                    body.storage_error = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };
    let mut body = body.into_inner();

    if let Err(e) = performed {
        if e.is_write_error() {
            if let Some(io_err) = body.storage_error.take() {
                return Err(FetchError::Storage(io_err));
            }
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if code >= 400 {
        if code == 416 && offset > 0 {
            return match body.head.content_range_total {
                Some(total) if total == offset => {
                    tracing::debug!(offset, "local file already holds the whole resource");
                    Ok(offset)
                }
                total => {
                    body.sink.restart().map_err(FetchError::Storage)?;
                    Err(FetchError::RangeNotSatisfiable { offset, total })
                }
            };
        }
        return Err(FetchError::Http(code));
    }

    if !body.started && offset > 0 && code != 206 {
        // Empty full-body answer to a range request: the old prefix is stale too.
        body.sink.restart().map_err(FetchError::Storage)?;
    }

    if let Some(expected) = body.head.content_length {
        if body.received < expected {
            return Err(FetchError::PartialTransfer {
                expected,
                received: body.received,
            });
        }
    }

    body.sink.sync().map_err(FetchError::Storage)?;
    Ok(body.sink.len())
}
