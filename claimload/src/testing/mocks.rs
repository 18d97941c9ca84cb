//! A scripted, stateful stand-in for the Wikibase API.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::api::{ClaimApi, CreatedClaim, EditToken, EntityClaims};
use crate::errors::{ClaimloadError, Result};

/// A failure the scripted API can be told to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// Non-2xx HTTP response.
    Status(u16),
    /// 200 response carrying an `error` object.
    Api {
        /// Error code.
        code: String,
        /// Error text.
        info: String,
    },
    /// No response at all.
    Transport(String),
    /// A body that could not be understood.
    Malformed(String),
    /// The anonymous edit token.
    AnonymousToken,
}

impl ApiFailure {
    /// Shorthand for an API error payload.
    #[must_use]
    pub fn api(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            info: info.into(),
        }
    }

    fn to_error(&self) -> ClaimloadError {
        match self {
            Self::Status(status) => ClaimloadError::HttpStatus {
                status: *status,
                reason: reqwest::StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or_default()
                    .to_string(),
                body: String::new(),
            },
            Self::Api { code, info } => ClaimloadError::Api {
                code: code.clone(),
                info: info.clone(),
            },
            Self::Transport(msg) => ClaimloadError::Transport(msg.clone()),
            Self::Malformed(body) => ClaimloadError::MalformedResponse(body.clone()),
            Self::AnonymousToken => ClaimloadError::AnonymousToken,
        }
    }
}

/// One call received by [`ScriptedClaimApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `existing_claims(item_id, property_id)`.
    ExistingClaims {
        /// Item asked about.
        item_id: String,
        /// Property asked about.
        property_id: String,
    },
    /// `edit_token()`.
    EditToken,
    /// `create_claim(...)`.
    CreateClaim {
        /// Target item.
        item_id: String,
        /// Property written.
        property_id: String,
        /// Value written.
        value: String,
        /// Token presented.
        token: String,
    },
}

#[derive(Debug, Default)]
struct ScriptState {
    values: HashMap<(String, String), Vec<String>>,
    redirects: HashMap<String, String>,
    missing: HashSet<String>,
    failing_checks: HashMap<String, ApiFailure>,
    failing_writes: HashMap<String, ApiFailure>,
    token_failures: VecDeque<ApiFailure>,
    tokens_issued: usize,
    calls: Vec<ApiCall>,
}

/// Wikibase stand-in that remembers written claims across calls.
///
/// Successful writes are visible to later `existing_claims` calls, so a
/// second run over the same rows sees the values the first run added.
#[derive(Debug, Default)]
pub struct ScriptedClaimApi {
    state: Mutex<ScriptState>,
}

impl ScriptedClaimApi {
    /// Creates an API where every item exists and carries no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds existing values of `property_id` on `item_id`.
    #[must_use]
    pub fn with_values<I, S>(self, item_id: &str, property_id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .values
            .entry((item_id.to_string(), property_id.to_string()))
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Makes `item_id` a redirect to `target`.
    #[must_use]
    pub fn with_redirect(self, item_id: &str, target: &str) -> Self {
        self.state
            .lock()
            .redirects
            .insert(item_id.to_string(), target.to_string());
        self
    }

    /// Makes `item_id` a missing entity.
    #[must_use]
    pub fn with_missing(self, item_id: &str) -> Self {
        self.state.lock().missing.insert(item_id.to_string());
        self
    }

    /// Makes every claim lookup for `item_id` fail.
    #[must_use]
    pub fn fail_check(self, item_id: &str, failure: ApiFailure) -> Self {
        self.state
            .lock()
            .failing_checks
            .insert(item_id.to_string(), failure);
        self
    }

    /// Makes every write to `item_id` fail.
    #[must_use]
    pub fn fail_write(self, item_id: &str, failure: ApiFailure) -> Self {
        self.state
            .lock()
            .failing_writes
            .insert(item_id.to_string(), failure);
        self
    }

    /// Makes the next token request fail; queued failures are used in order.
    #[must_use]
    pub fn fail_next_token(self, failure: ApiFailure) -> Self {
        self.state.lock().token_failures.push_back(failure);
        self
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Write requests received, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ApiCall::CreateClaim { .. }))
            .collect()
    }

    /// Number of token requests received.
    #[must_use]
    pub fn token_requests(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ApiCall::EditToken))
            .count()
    }

    /// Current values of `property_id` on `item_id`.
    #[must_use]
    pub fn values_of(&self, item_id: &str, property_id: &str) -> Vec<String> {
        self.state
            .lock()
            .values
            .get(&(item_id.to_string(), property_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClaimApi for ScriptedClaimApi {
    async fn existing_claims(&self, item_id: &str, property_id: &str) -> Result<EntityClaims> {
        let mut state = self.state.lock();
        state.calls.push(ApiCall::ExistingClaims {
            item_id: item_id.to_string(),
            property_id: property_id.to_string(),
        });

        if let Some(failure) = state.failing_checks.get(item_id) {
            return Err(failure.to_error());
        }
        if let Some(target) = state.redirects.get(item_id) {
            return Ok(EntityClaims::redirect(item_id, target.clone()));
        }
        if state.missing.contains(item_id) {
            return Ok(EntityClaims {
                item_id: item_id.to_string(),
                missing: true,
                ..EntityClaims::default()
            });
        }
        let values = state
            .values
            .get(&(item_id.to_string(), property_id.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(EntityClaims::with_values(item_id, values))
    }

    async fn edit_token(&self) -> Result<EditToken> {
        let mut state = self.state.lock();
        state.calls.push(ApiCall::EditToken);
        if let Some(failure) = state.token_failures.pop_front() {
            return Err(failure.to_error());
        }
        state.tokens_issued += 1;
        Ok(EditToken::new(format!("token-{}+\\", state.tokens_issued)))
    }

    async fn create_claim(
        &self,
        item_id: &str,
        property_id: &str,
        value: &str,
        token: &EditToken,
    ) -> Result<CreatedClaim> {
        let mut state = self.state.lock();
        state.calls.push(ApiCall::CreateClaim {
            item_id: item_id.to_string(),
            property_id: property_id.to_string(),
            value: value.to_string(),
            token: token.as_str().to_string(),
        });

        if let Some(failure) = state.failing_writes.get(item_id) {
            return Err(failure.to_error());
        }
        let values = state
            .values
            .entry((item_id.to_string(), property_id.to_string()))
            .or_default();
        values.push(value.to_string());
        Ok(CreatedClaim {
            claim_id: format!("{item_id}$claim-{}", values.len()),
            last_revision: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_written_values_are_visible() {
        let api = ScriptedClaimApi::new();
        let token = api.edit_token().await.unwrap();
        api.create_claim("Q1", "P1", "v", &token).await.unwrap();

        let claims = api.existing_claims("Q1", "P1").await.unwrap();
        assert!(claims.contains("v"));
        assert_eq!(api.values_of("Q1", "P1"), vec!["v".to_string()]);
    }

    #[tokio::test]
    async fn test_tokens_are_fresh() {
        let api = ScriptedClaimApi::new();
        let first = api.edit_token().await.unwrap();
        let second = api.edit_token().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(api.token_requests(), 2);
    }

    #[tokio::test]
    async fn test_queued_token_failures() {
        let api = ScriptedClaimApi::new().fail_next_token(ApiFailure::Status(403));
        let err = api.edit_token().await.unwrap_err();
        assert_eq!(err.to_string(), "403 Forbidden");
        assert!(api.edit_token().await.is_ok());
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let api = ScriptedClaimApi::new()
            .fail_check("Q1", ApiFailure::Transport("reset".into()))
            .fail_write("Q2", ApiFailure::api("badtoken", "Invalid CSRF token."))
            .with_redirect("Q3", "Q30")
            .with_missing("Q4");

        assert!(api.existing_claims("Q1", "P1").await.is_err());
        let token = EditToken::new("t");
        let err = api.create_claim("Q2", "P1", "v", &token).await.unwrap_err();
        assert_eq!(err.to_string(), "api error badtoken: Invalid CSRF token.");
        assert_eq!(
            api.existing_claims("Q3", "P1").await.unwrap().redirect_to.as_deref(),
            Some("Q30")
        );
        assert!(api.existing_claims("Q4", "P1").await.unwrap().missing);
        assert_eq!(api.calls().len(), 4);
        assert_eq!(api.writes().len(), 1);
    }
}
