//! Configuration for the upload run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{is_property_id, ValueFormat};
use crate::errors::{ClaimloadError, Result};

/// Wikidata's Action API endpoint.
pub const DEFAULT_API_BASE: &str = "https://www.wikidata.org/w/api.php";

/// The LUX URI property on Wikidata.
pub const DEFAULT_PROPERTY_ID: &str = "P13591";

/// Settings that shape every remote call and the pacing between rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Action API endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Property the claim is written under.
    #[serde(default = "default_property_id")]
    pub property_id: String,
    /// Fixed delay between rows, in seconds.
    #[serde(default = "default_pacing")]
    pub pacing_seconds: f64,
    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// `maxlag` parameter sent with writes.
    #[serde(default = "default_maxlag")]
    pub maxlag: u32,
    /// How the external URI becomes the claim value.
    #[serde(default)]
    pub value_format: ValueFormat,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_property_id() -> String {
    DEFAULT_PROPERTY_ID.to_string()
}

fn default_pacing() -> f64 {
    5.0
}

fn default_timeout() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    concat!("claimload/", env!("CARGO_PKG_VERSION"), " (batch external-id uploader)").to_string()
}

fn default_maxlag() -> u32 {
    5
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            property_id: default_property_id(),
            pacing_seconds: default_pacing(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            maxlag: default_maxlag(),
            value_format: ValueFormat::default(),
        }
    }
}

impl UploaderConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the property ID.
    #[must_use]
    pub fn with_property_id(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = property_id.into();
        self
    }

    /// Sets the pacing delay.
    #[must_use]
    pub fn with_pacing(mut self, seconds: f64) -> Self {
        self.pacing_seconds = seconds;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the `maxlag` parameter.
    #[must_use]
    pub fn with_maxlag(mut self, maxlag: u32) -> Self {
        self.maxlag = maxlag;
        self
    }

    /// Sets the value format.
    #[must_use]
    pub fn with_value_format(mut self, format: ValueFormat) -> Self {
        self.value_format = format;
        self
    }

    /// Gets the pacing delay as a Duration.
    #[must_use]
    pub fn pacing(&self) -> Duration {
        Duration::from_secs_f64(self.pacing_seconds.max(0.0))
    }

    /// Gets the timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds.max(0.0))
    }

    /// Checks the configuration before any row is processed.
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(ClaimloadError::Config("api_base must not be empty".into()));
        }
        if !is_property_id(&self.property_id) {
            return Err(ClaimloadError::Config(format!(
                "property id '{}' is not of the form P<number>",
                self.property_id
            )));
        }
        if !self.pacing_seconds.is_finite() || self.pacing_seconds < 0.0 {
            return Err(ClaimloadError::Config(format!(
                "pacing must be a non-negative number of seconds, got {}",
                self.pacing_seconds
            )));
        }
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(ClaimloadError::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout_seconds
            )));
        }
        Ok(())
    }
}

/// Files read and written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPaths {
    /// Two-column input table.
    pub input: PathBuf,
    /// Ledger of successful rows.
    pub success_log: PathBuf,
    /// Ledger of failed rows; valid input for a retry run.
    pub failure_log: PathBuf,
    /// Optional ledger of items found to be redirects.
    #[serde(default)]
    pub redirect_log: Option<PathBuf>,
    /// Optional activity log file.
    #[serde(default)]
    pub activity_log: Option<PathBuf>,
}

impl RunPaths {
    /// Creates paths with no redirect or activity log.
    #[must_use]
    pub fn new(
        input: impl AsRef<Path>,
        success_log: impl AsRef<Path>,
        failure_log: impl AsRef<Path>,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            success_log: success_log.as_ref().to_path_buf(),
            failure_log: failure_log.as_ref().to_path_buf(),
            redirect_log: None,
            activity_log: None,
        }
    }

    /// Sets the redirect log.
    #[must_use]
    pub fn with_redirect_log(mut self, path: impl AsRef<Path>) -> Self {
        self.redirect_log = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the activity log.
    #[must_use]
    pub fn with_activity_log(mut self, path: impl AsRef<Path>) -> Self {
        self.activity_log = Some(path.as_ref().to_path_buf());
        self
    }

    /// Rejects path sets where two ledgers would share a file.
    pub fn validate(&self) -> Result<()> {
        if self.success_log == self.failure_log {
            return Err(ClaimloadError::Config(
                "success and failure logs must be different files".into(),
            ));
        }
        if self.input == self.success_log {
            return Err(ClaimloadError::Config(
                "input must not be the success log".into(),
            ));
        }
        if let Some(ref redirect) = self.redirect_log {
            if redirect == &self.success_log || redirect == &self.failure_log {
                return Err(ClaimloadError::Config(
                    "redirect log must not share a file with the outcome logs".into(),
                ));
            }
        }
        Ok(())
    }
}
