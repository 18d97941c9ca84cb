//! Error types for claimload.
//!
//! Startup failures (credentials, configuration, unreadable input) and
//! row-level failures (transport, HTTP status, API error payloads) share one
//! enum. The uploader turns row-level errors into failure outcomes; the CLI
//! turns startup errors into a non-zero exit.

use thiserror::Error;

/// The main error type for claimload operations.
#[derive(Debug, Error)]
pub enum ClaimloadError {
    /// A required credential was not present in the environment.
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),

    /// The run configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The input table could not be read.
    #[error("cannot read input {path}: {message}")]
    Input {
        /// Path of the input file.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("{status} {reason}{}", format_body(.body))]
    HttpStatus {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
        /// Leading part of the response body.
        body: String,
    },

    /// The service answered 200 with an `error` object.
    #[error("api error {code}: {info}")]
    Api {
        /// Machine-readable error code (e.g. `maxlag`, `badtoken`).
        code: String,
        /// Human-readable explanation.
        info: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The token endpoint handed out the anonymous token.
    #[error("anonymous edit token returned; credentials were not accepted")]
    AnonymousToken,

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl ClaimloadError {
    /// Creates an input error for the given path.
    #[must_use]
    pub fn input(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Returns true if the error can only come from a remote call.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::HttpStatus { .. }
                | Self::Api { .. }
                | Self::MalformedResponse(_)
                | Self::AnonymousToken
        )
    }
}

impl From<reqwest::Error> for ClaimloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("timed out: {err}"))
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ClaimloadError>;
