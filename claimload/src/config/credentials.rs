//! OAuth1 owner-only consumer credentials.

use std::fmt;

use crate::errors::{ClaimloadError, Result};

/// Environment variable holding the consumer key.
pub const CONSUMER_KEY_VAR: &str = "CONSUMER_KEY";
/// Environment variable holding the consumer secret.
pub const CONSUMER_SECRET_VAR: &str = "CONSUMER_SECRET";
/// Environment variable holding the access token.
pub const ACCESS_TOKEN_VAR: &str = "ACCESS_TOKEN";
/// Environment variable holding the access secret.
pub const ACCESS_SECRET_VAR: &str = "ACCESS_SECRET";

/// The four OAuth1 strings that sign every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Consumer (application) key.
    pub consumer_key: String,
    /// Consumer (application) secret.
    pub consumer_secret: String,
    /// Access token issued to the editing account.
    pub access_token: String,
    /// Secret paired with the access token.
    pub access_secret: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_secret: access_secret.into(),
        }
    }

    /// Reads credentials from the process environment.
    ///
    /// Load a `.env` file before calling this if one is used.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ClaimloadError::MissingCredential(name.to_string()))
        };

        Ok(Self {
            consumer_key: get(CONSUMER_KEY_VAR)?,
            consumer_secret: get(CONSUMER_SECRET_VAR)?,
            access_token: get(ACCESS_TOKEN_VAR)?,
            access_secret: get(ACCESS_SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .finish()
    }
}
