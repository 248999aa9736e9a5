// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod session;
pub mod setup;
pub mod store;
pub mod ui;
pub mod variance;

pub use error::{Result, TrackerError};
