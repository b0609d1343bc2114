#![allow(dead_code)]

pub mod range_server;

use bulkdl_core::progress::ProgressObserver;
use bulkdl_core::retry::Sleeper;
use bulkdl_core::transfer::TransferContext;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records backoff delays instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.sleeps.lock().unwrap().push(delay);
    }
}

/// Progress calls as `(kind, url, value)`.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<(&'static str, String, u64)>>,
}

impl ProgressObserver for RecordingProgress {
    fn started(&self, url: &str, _filename: &str, initial: u64, _total: Option<u64>) {
        self.events
            .lock()
            .unwrap()
            .push(("started", url.to_string(), initial));
    }

    fn advanced(&self, url: &str, bytes_done: u64) {
        self.events
            .lock()
            .unwrap()
            .push(("advanced", url.to_string(), bytes_done));
    }

    fn finished(&self, url: &str, success: bool) {
        self.events
            .lock()
            .unwrap()
            .push(("finished", url.to_string(), success as u64));
    }
}

/// Default transfer context with a recording sleeper, so retries never wait.
pub fn test_context() -> (TransferContext, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = TransferContext::default().with_sleeper(sleeper.clone());
    (ctx, sleeper)
}

/// Deterministic non-trivial body.
pub fn body(len: usize) -> Vec<u8> {
    (0u8..=250).cycle().take(len).collect()
}
