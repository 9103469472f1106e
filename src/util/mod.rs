//! Utility functions and helpers.

mod logging;
mod shutdown;

pub use logging::{init_logging, LogFormat, LOG_ENV};
pub use shutdown::StopSignal;
