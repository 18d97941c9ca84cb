//! Wall-clock timing for remote calls and rows.

use std::time::{Duration, Instant};

/// Measures one API call (named after its action) or one row (named after
/// its item ID) for the `duration_ms` field of the log line that closes it.
#[derive(Debug)]
pub struct CallTimer {
    started: Instant,
    name: String,
}

impl CallTimer {
    /// Starts timing `name`, e.g. `"wbcreateclaim"` or `"Q42"`.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            name: name.into(),
        }
    }

    /// The API action or item being timed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time since `start`.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since `start` in fractional milliseconds, as logged.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Consumes the timer once the call or row is done.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
