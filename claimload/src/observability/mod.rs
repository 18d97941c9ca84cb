//! Logging setup and timing helpers.

mod logging;
mod timer;

pub use logging::{init_logging, open_append, LogFormat, DEFAULT_FILTER};
pub use timer::CallTimer;
