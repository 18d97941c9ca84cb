//! Response models for the Wikibase Action API and their decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::errors::{ClaimloadError, Result};

/// Longest response excerpt carried inside an error.
const MAX_EXCERPT_CHARS: usize = 500;

/// The token MediaWiki hands to requests it treats as anonymous.
pub const ANONYMOUS_TOKEN: &str = "+\\";

/// A CSRF edit token; valid for a short time and one session.
#[derive(Clone, PartialEq, Eq)]
pub struct EditToken(String);

impl EditToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the anonymous token.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_TOKEN
    }
}

impl fmt::Debug for EditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EditToken(<{} chars>)", self.0.len())
    }
}

/// Current values of one property on one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityClaims {
    /// The item that was asked for.
    pub item_id: String,
    /// String values of the property's statements, in statement order.
    pub values: Vec<String>,
    /// Target item if the requested item is a redirect.
    pub redirect_to: Option<String>,
    /// True if the item does not exist.
    pub missing: bool,
}

impl EntityClaims {
    /// An existing item with no statements for the property.
    #[must_use]
    pub fn empty(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            ..Self::default()
        }
    }

    /// An existing item carrying the given values.
    #[must_use]
    pub fn with_values<I, S>(item_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            item_id: item_id.into(),
            values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A redirect from the requested item to `target`.
    #[must_use]
    pub fn redirect(item_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            redirect_to: Some(target.into()),
            ..Self::default()
        }
    }

    /// Returns true if some statement holds exactly `value`.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// The statement created by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedClaim {
    /// GUID of the new statement.
    pub claim_id: String,
    /// Revision created by the edit, when reported.
    pub last_revision: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    query: TokensQuery,
}

#[derive(Debug, Deserialize)]
struct TokensQuery {
    tokens: Tokens,
}

#[derive(Debug, Deserialize)]
struct Tokens {
    csrftoken: String,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, Entity>,
    #[serde(default)]
    redirects: Vec<Redirect>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    missing: Option<Value>,
    #[serde(default)]
    redirects: Option<Redirect>,
    #[serde(default)]
    claims: HashMap<String, Vec<Statement>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Redirect {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct Statement {
    mainsnak: Snak,
}

#[derive(Debug, Deserialize)]
struct Snak {
    #[serde(default)]
    datavalue: Option<DataValue>,
}

#[derive(Debug, Deserialize)]
struct DataValue {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct CreateClaimResponse {
    #[serde(default)]
    claim: Option<ClaimRef>,
    #[serde(default)]
    pageinfo: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct ClaimRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    lastrevid: u64,
}

/// Shortens a response body for inclusion in an error detail.
#[must_use]
pub fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Turns an HTTP status and body into a JSON document.
///
/// Non-2xx statuses, bodies that are not JSON and bodies carrying an
/// `error` object all become errors.
pub fn decode_body(status: u16, reason: &str, text: &str) -> Result<Value> {
    if !(200..300).contains(&status) {
        return Err(ClaimloadError::HttpStatus {
            status,
            reason: reason.to_string(),
            body: excerpt(text),
        });
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|_| ClaimloadError::MalformedResponse(excerpt(text)))?;
    check_api_error(&value)?;
    Ok(value)
}

/// Fails with [`ClaimloadError::Api`] if the document carries an `error`.
pub fn check_api_error(value: &Value) -> Result<()> {
    match value.get("error") {
        None => Ok(()),
        Some(error) => {
            let body: ApiErrorBody = serde_json::from_value(error.clone())
                .map_err(|_| ClaimloadError::MalformedResponse(excerpt(&error.to_string())))?;
            Err(ClaimloadError::Api {
                code: body.code,
                info: body.info,
            })
        }
    }
}

fn malformed(value: &Value) -> ClaimloadError {
    ClaimloadError::MalformedResponse(excerpt(&value.to_string()))
}

/// Extracts the CSRF token from a `meta=tokens` response.
pub fn parse_edit_token(value: &Value) -> Result<EditToken> {
    let response: TokensResponse =
        serde_json::from_value(value.clone()).map_err(|_| malformed(value))?;
    let token = EditToken::new(response.query.tokens.csrftoken);
    if token.is_anonymous() {
        return Err(ClaimloadError::AnonymousToken);
    }
    Ok(token)
}

/// Extracts the string values of `property_id` on `item_id` from a
/// `wbgetentities` response.
pub fn parse_entity_claims(value: &Value, item_id: &str, property_id: &str) -> Result<EntityClaims> {
    let mut response: EntitiesResponse =
        serde_json::from_value(value.clone()).map_err(|_| malformed(value))?;

    let top_level_redirect = response
        .redirects
        .iter()
        .find(|r| r.from == item_id)
        .map(|r| r.to.clone());

    let entity = match response.entities.remove(item_id) {
        Some(entity) => entity,
        None if response.entities.len() == 1 => {
            // Redirected lookups may be keyed by the target.
            response
                .entities
                .into_values()
                .next()
                .ok_or_else(|| malformed(value))?
        }
        None => return Err(malformed(value)),
    };

    let redirect_to = top_level_redirect
        .or_else(|| {
            entity
                .redirects
                .as_ref()
                .filter(|r| r.from == item_id)
                .map(|r| r.to.clone())
        })
        .or_else(|| entity.id.clone().filter(|id| id != item_id));

    if let Some(target) = redirect_to {
        return Ok(EntityClaims::redirect(item_id, target));
    }

    if entity.missing.is_some() {
        return Ok(EntityClaims {
            item_id: item_id.to_string(),
            missing: true,
            ..EntityClaims::default()
        });
    }

    let values: Vec<String> = entity
        .claims
        .get(property_id)
        .map(|statements| {
            statements
                .iter()
                .filter_map(|s| s.mainsnak.datavalue.as_ref())
                .filter_map(|dv| dv.value.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(EntityClaims::with_values(item_id, values))
}

/// Confirms a `wbcreateclaim` response created a statement.
pub fn parse_created_claim(value: &Value) -> Result<CreatedClaim> {
    let response: CreateClaimResponse =
        serde_json::from_value(value.clone()).map_err(|_| malformed(value))?;
    match response.claim {
        Some(claim) => Ok(CreatedClaim {
            claim_id: claim.id,
            last_revision: response.pageinfo.map(|p| p.lastrevid),
        }),
        None => Err(ClaimloadError::MalformedResponse(format!(
            "no claim in response: {}",
            excerpt(&value.to_string())
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_body_http_error() {
        let err = decode_body(403, "Forbidden", "Forbidden by policy").unwrap_err();
        assert_eq!(err.to_string(), "403 Forbidden: Forbidden by policy");
    }

    #[test]
    fn test_decode_body_not_json() {
        let err = decode_body(200, "OK", "<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, ClaimloadError::MalformedResponse(ref b) if b.contains("maintenance")));
    }

    #[test]
    fn test_decode_body_api_error() {
        let body = json!({
            "error": {"code": "maxlag", "info": "Waiting for a database server: 6 seconds lagged.", "lag": 6},
            "servedby": "mw1"
        });
        let err = decode_body(200, "OK", &body.to_string()).unwrap_err();
        assert!(matches!(err, ClaimloadError::Api { ref code, .. } if code == "maxlag"));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(MAX_EXCERPT_CHARS + 20);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), MAX_EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_parse_edit_token() {
        let body = json!({"batchcomplete": "", "query": {"tokens": {"csrftoken": "abc123+\\"}}});
        let token = parse_edit_token(&body).unwrap();
        assert_eq!(token.as_str(), "abc123+\\");
        assert!(!format!("{token:?}").contains("abc123"));
    }

    #[test]
    fn test_parse_edit_token_anonymous() {
        let body = json!({"query": {"tokens": {"csrftoken": "+\\"}}});
        let err = parse_edit_token(&body).unwrap_err();
        assert!(matches!(err, ClaimloadError::AnonymousToken));
    }

    #[test]
    fn test_parse_edit_token_malformed() {
        let err = parse_edit_token(&json!({"query": {}})).unwrap_err();
        assert!(matches!(err, ClaimloadError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_entity_claims_values() {
        let body = json!({
            "entities": {
                "Q100": {
                    "type": "item",
                    "id": "Q100",
                    "claims": {
                        "P13591": [
                            {"mainsnak": {"snaktype": "value", "property": "P13591",
                                "datavalue": {"value": "https://lux.example/data/person/1", "type": "string"}},
                             "id": "Q100$1"},
                            {"mainsnak": {"snaktype": "somevalue", "property": "P13591"}, "id": "Q100$2"}
                        ],
                        "P31": [
                            {"mainsnak": {"snaktype": "value", "property": "P31",
                                "datavalue": {"value": {"entity-type": "item", "id": "Q5"}, "type": "wikibase-entityid"}}}
                        ]
                    }
                }
            },
            "success": 1
        });
        let claims = parse_entity_claims(&body, "Q100", "P13591").unwrap();
        assert_eq!(claims.values, vec!["https://lux.example/data/person/1".to_string()]);
        assert!(claims.contains("https://lux.example/data/person/1"));
        assert!(!claims.contains("https://lux.example/data/person/2"));
        assert!(!claims.missing);
        assert_eq!(claims.redirect_to, None);
    }

    #[test]
    fn test_parse_entity_claims_absent_property() {
        let body = json!({"entities": {"Q7": {"id": "Q7", "claims": {}}}});
        let claims = parse_entity_claims(&body, "Q7", "P13591").unwrap();
        assert_eq!(claims, EntityClaims::empty("Q7"));
    }

    #[test]
    fn test_parse_entity_claims_keeps_statement_order() {
        let statement = |v: &str| json!({"mainsnak": {"snaktype": "value", "datavalue": {"value": v, "type": "string"}}});
        let body = json!({
            "entities": {"Q8": {"id": "Q8", "claims": {"P13591": [statement("b"), statement("a")]}}}
        });
        let claims = parse_entity_claims(&body, "Q8", "P13591").unwrap();
        assert_eq!(claims, EntityClaims::with_values("Q8", ["b", "a"]));
    }

    #[test]
    fn test_parse_entity_claims_missing_item() {
        let body = json!({"entities": {"Q999999999": {"id": "Q999999999", "missing": ""}}});
        let claims = parse_entity_claims(&body, "Q999999999", "P13591").unwrap();
        assert!(claims.missing);
    }

    #[test]
    fn test_parse_entity_claims_redirect_in_entity() {
        let body = json!({
            "entities": {"Q1": {"id": "Q2", "redirects": {"from": "Q1", "to": "Q2"}, "claims": {}}}
        });
        let claims = parse_entity_claims(&body, "Q1", "P13591").unwrap();
        assert_eq!(claims.redirect_to.as_deref(), Some("Q2"));
    }

    #[test]
    fn test_parse_entity_claims_redirect_keyed_by_target() {
        let body = json!({"entities": {"Q2": {"id": "Q2", "claims": {}}}});
        let claims = parse_entity_claims(&body, "Q1", "P13591").unwrap();
        assert_eq!(claims.redirect_to.as_deref(), Some("Q2"));
    }

    #[test]
    fn test_parse_entity_claims_top_level_redirects() {
        let body = json!({
            "entities": {"Q2": {"id": "Q2"}},
            "redirects": [{"from": "Q1", "to": "Q2"}]
        });
        let claims = parse_entity_claims(&body, "Q1", "P13591").unwrap();
        assert_eq!(claims, EntityClaims::redirect("Q1", "Q2"));
    }

    #[test]
    fn test_parse_created_claim() {
        let body = json!({
            "pageinfo": {"lastrevid": 2_245_001_234_u64},
            "success": 1,
            "claim": {"id": "Q100$5627445f-43cb-ed6d-3adb-760e85bd17ee", "type": "statement"}
        });
        let created = parse_created_claim(&body).unwrap();
        assert_eq!(created.claim_id, "Q100$5627445f-43cb-ed6d-3adb-760e85bd17ee");
        assert_eq!(created.last_revision, Some(2_245_001_234));
    }

    #[test]
    fn test_parse_created_claim_without_claim() {
        let err = parse_created_claim(&json!({"success": 1})).unwrap_err();
        assert!(err.to_string().contains("no claim in response"));
    }
}
