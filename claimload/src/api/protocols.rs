//! The remote operations the uploader depends on.

use async_trait::async_trait;

use super::models::{CreatedClaim, EditToken, EntityClaims};
use crate::errors::Result;

/// Protocol for the three calls an upload makes per row.
///
/// Implementations must not cache edit tokens between calls to
/// [`ClaimApi::edit_token`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimApi: Send + Sync {
    /// Reads the current values of `property_id` on `item_id`.
    async fn existing_claims(&self, item_id: &str, property_id: &str) -> Result<EntityClaims>;

    /// Obtains a fresh edit token for the authenticated session.
    async fn edit_token(&self) -> Result<EditToken>;

    /// Creates a string-valued statement on `item_id`.
    async fn create_claim(
        &self,
        item_id: &str,
        property_id: &str,
        value: &str,
        token: &EditToken,
    ) -> Result<CreatedClaim>;
}
