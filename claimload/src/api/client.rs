//! OAuth1-signed HTTP client for the Wikibase Action API.

use async_trait::async_trait;
use oauth1_request as oauth;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use super::models::{
    decode_body, parse_created_claim, parse_edit_token, parse_entity_claims, CreatedClaim,
    EditToken, EntityClaims,
};
use super::protocols::ClaimApi;
use crate::config::{Credentials, UploaderConfig};
use crate::errors::{ClaimloadError, Result};
use crate::observability::CallTimer;

#[derive(oauth::Request)]
struct GetEntities<'a> {
    action: &'a str,
    format: &'a str,
    ids: &'a str,
    props: &'a str,
}

#[derive(oauth::Request)]
struct QueryTokens<'a> {
    action: &'a str,
    format: &'a str,
    meta: &'a str,
    #[oauth1(rename = "type")]
    token_type: &'a str,
}

#[derive(oauth::Request)]
struct CreateClaim<'a> {
    action: &'a str,
    bot: u8,
    entity: &'a str,
    format: &'a str,
    maxlag: u32,
    property: &'a str,
    snaktype: &'a str,
    token: &'a str,
    value: &'a str,
}

/// Client that signs every request with the account's OAuth1 credentials.
pub struct WikibaseClient {
    http: reqwest::Client,
    token: oauth::Token<String, String>,
    api_base: String,
    maxlag: u32,
}

impl std::fmt::Debug for WikibaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikibaseClient")
            .field("api_base", &self.api_base)
            .field("maxlag", &self.maxlag)
            .finish_non_exhaustive()
    }
}

impl WikibaseClient {
    /// Builds a client with the configured timeout and user agent.
    pub fn new(config: &UploaderConfig, credentials: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ClaimloadError::Config(format!("cannot build HTTP client: {e}")))?;

        let token = oauth::Token::from_parts(
            credentials.consumer_key.clone(),
            credentials.consumer_secret.clone(),
            credentials.access_token.clone(),
            credentials.access_secret.clone(),
        );

        Ok(Self {
            http,
            token,
            api_base: config.api_base.clone(),
            maxlag: config.maxlag,
        })
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn signed_get<R>(&self, request: &R, call: &str) -> Result<Value>
    where
        R: oauth::Request + Sync,
    {
        let timer = CallTimer::start(call);
        let uri = oauth::to_query(self.api_base.clone(), request);
        let authorization = oauth::get(&self.api_base, request, &self.token, oauth::HMAC_SHA1);

        let response = self
            .http
            .get(uri)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        self.finish(response, timer).await
    }

    async fn signed_post<R>(&self, request: &R, call: &str) -> Result<Value>
    where
        R: oauth::Request + Sync,
    {
        let timer = CallTimer::start(call);
        let authorization = oauth::post(&self.api_base, request, &self.token, oauth::HMAC_SHA1);
        let form = oauth::to_form(request);

        let response = self
            .http
            .post(&self.api_base)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;
        self.finish(response, timer).await
    }

    async fn finish(&self, response: reqwest::Response, timer: CallTimer) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;
        debug!(
            call = timer.name(),
            status = status.as_u16(),
            duration_ms = timer.elapsed_ms(),
            "API call finished"
        );
        decode_body(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &text,
        )
    }
}

#[async_trait]
impl ClaimApi for WikibaseClient {
    async fn existing_claims(&self, item_id: &str, property_id: &str) -> Result<EntityClaims> {
        let request = GetEntities {
            action: "wbgetentities",
            format: "json",
            ids: item_id,
            props: "claims",
        };
        let body = self.signed_get(&request, "wbgetentities").await?;
        parse_entity_claims(&body, item_id, property_id)
    }

    async fn edit_token(&self) -> Result<EditToken> {
        let request = QueryTokens {
            action: "query",
            format: "json",
            meta: "tokens",
            token_type: "csrf",
        };
        let body = self.signed_get(&request, "query.tokens").await?;
        parse_edit_token(&body)
    }

    async fn create_claim(
        &self,
        item_id: &str,
        property_id: &str,
        value: &str,
        token: &EditToken,
    ) -> Result<CreatedClaim> {
        // String datavalues travel as JSON string literals.
        let encoded_value = serde_json::to_string(value)?;
        let request = CreateClaim {
            action: "wbcreateclaim",
            bot: 1,
            entity: item_id,
            format: "json",
            maxlag: self.maxlag,
            property: property_id,
            snaktype: "value",
            token: token.as_str(),
            value: &encoded_value,
        };
        let body = self.signed_post(&request, "wbcreateclaim").await?;
        parse_created_claim(&body)
    }
}
