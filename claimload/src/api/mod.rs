//! Access to the Wikibase Action API.
//!
//! This module provides:
//! - The [`ClaimApi`] protocol the uploader is written against
//! - Response models and their decoding
//! - An OAuth1-signed `reqwest` implementation

mod client;
mod models;
mod protocols;

pub use client::WikibaseClient;
pub use models::{
    check_api_error, decode_body, excerpt, parse_created_claim, parse_edit_token,
    parse_entity_claims, CreatedClaim, EditToken, EntityClaims, ANONYMOUS_TOKEN,
};
pub use protocols::ClaimApi;

#[cfg(test)]
pub use protocols::MockClaimApi;
