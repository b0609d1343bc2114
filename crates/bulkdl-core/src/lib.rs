pub mod config;
pub mod ledger;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod scheduler;
pub mod storage;
pub mod transfer;
pub mod url_list;
pub mod url_model;
