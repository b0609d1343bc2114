//! Append-only writer for a target file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Sequential sink for one response body. Opened in append mode, so after a
/// `restart` (truncate to zero) writes land at the start again.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    len: u64,
}

impl FileSink {
    /// Create (or truncate) `path` for a download from offset 0.
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut sink = Self::open(path)?;
        sink.restart()?;
        Ok(sink)
    }

    /// Open `path` for appending after its current contents (resume).
    pub fn append(path: &Path) -> io::Result<Self> {
        Self::open(path)
    }

    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }

    /// Append `data`; it is handed to the OS before returning.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.len += data.len() as u64;
        Ok(())
    }

    /// Discard everything written so far (the existing bytes are not a valid prefix).
    pub fn restart(&mut self) -> io::Result<()> {
        self.file.set_len(0)?;
        self.len = 0;
        Ok(())
    }

    /// Bytes currently in the file.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Flush file data to disk.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_data()
    }
}
