//! Remote Data Gateway for the CRUD service.
//!
//! # Architecture
//!
//! - Thin mapping from domain operations to request/response calls
//! - The remote store is source of truth - no local caching, no retries
//! - Every call resolves to an [`Envelope`]; transport failures collapse to a
//!   generic "Connection Error" envelope and the detail only reaches the log
//!
//! # Example
//!
//! ```rust,ignore
//! use lumina_storefront::gateway::{RemoteGateway, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.api);
//! let products = client.list_products().await.into_result()?;
//! ```

mod client;
mod envelope;
mod wire;

use std::future::Future;

use lumina_core::{Email, Identity, NewReview, Product, ProductId, Review, UserId, WishlistEntry};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub use client::StorefrontClient;
pub use envelope::{Ack, CONNECTION_ERROR, Envelope, GatewayError};

/// Direction of a wishlist row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistAction {
    Add,
    Remove,
}

impl WishlistAction {
    /// The action matching a membership flag: `true` adds, `false` removes.
    #[must_use]
    pub const fn for_membership(member: bool) -> Self {
        if member { Self::Add } else { Self::Remove }
    }
}

/// Operations offered by the remote CRUD service.
///
/// [`StorefrontClient`] is the HTTP implementation; tests substitute an
/// in-memory one.
pub trait RemoteGateway: Send + Sync + 'static {
    /// `GET /products`
    fn list_products(&self) -> impl Future<Output = Envelope<Vec<Product>>> + Send;

    /// `GET /products?id=`
    fn get_product(&self, id: &ProductId) -> impl Future<Output = Envelope<Product>> + Send;

    /// `GET /reviews?product_id=`
    fn list_reviews(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Envelope<Vec<Review>>> + Send;

    /// `POST /reviews`
    fn add_review(&self, review: &NewReview) -> impl Future<Output = Envelope<Review>> + Send;

    /// `POST /auth?action=login`
    fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Envelope<Identity>> + Send;

    /// `POST /auth?action=register`
    fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Envelope<Identity>> + Send;

    /// `GET /wishlist?user_id=`
    fn get_wishlist(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Envelope<Vec<WishlistEntry>>> + Send;

    /// `POST /wishlist`
    fn toggle_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        action: WishlistAction,
    ) -> impl Future<Output = Envelope<Ack>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wishlist_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&WishlistAction::Add).ok().as_deref(),
            Some("\"add\"")
        );
        assert_eq!(WishlistAction::for_membership(false), WishlistAction::Remove);
    }
}
