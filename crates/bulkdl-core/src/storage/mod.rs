//! Target-file storage.
//!
//! One `FileSink` per transfer attempt; the target path is owned by a single
//! worker at a time (see `scheduler::PathLocks`).

mod writer;

pub(crate) use writer::FileSink;

use std::io;
use std::path::Path;

/// Current length of the file at `path`, or 0 if it does not exist.
/// A directory at `path` is an error: we could never write the target there.
pub fn existing_len(path: &Path) -> io::Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} is a directory", path.display()),
        )),
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}
