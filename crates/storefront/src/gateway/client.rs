//! HTTP implementation of the gateway over `reqwest`.

use std::sync::Arc;

use chrono::Utc;
use lumina_core::{Email, Identity, NewReview, Product, ProductId, Review, UserId, WishlistEntry};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use super::wire::{LoginBody, RegisterBody, ToggleBody, WishlistRow};
use super::{Ack, Envelope, RemoteGateway, WishlistAction};
use crate::config::ApiConfig;

/// Why a request never produced a usable envelope. Logged, never returned.
#[derive(Debug, Error)]
enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the remote CRUD service.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    api: ApiConfig,
}

impl StorefrontClient {
    /// Create a new client for the configured service.
    #[must_use]
    pub fn new(api: &ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), api)
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                api: api.clone(),
            }),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.inner.client.get(self.inner.api.endpoint(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.inner.client.post(self.inner.api.endpoint(path))
    }

    /// Send a request and decode its envelope, collapsing every failure to
    /// [`Envelope::connection_error`].
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Envelope<T> {
        match Self::send(request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(error = %e, "API request failed");
                Envelope::connection_error()
            }
        }
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Envelope<T>, TransportError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "CRUD service returned non-success status"
            );
            return Err(TransportError::Status(status));
        }

        serde_json::from_str(&body).map_err(|e| {
            debug!(
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse CRUD service response"
            );
            TransportError::Parse(e)
        })
    }
}

impl RemoteGateway for StorefrontClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Envelope<Vec<Product>> {
        self.execute(self.get("/products")).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Envelope<Product> {
        self.execute(self.get("/products").query(&[("id", id.as_str())]))
            .await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn list_reviews(&self, product_id: &ProductId) -> Envelope<Vec<Review>> {
        self.execute(
            self.get("/reviews")
                .query(&[("product_id", product_id.as_str())]),
        )
        .await
    }

    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    async fn add_review(&self, review: &NewReview) -> Envelope<Review> {
        self.execute(self.post("/reviews").json(review)).await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &Email, password: &SecretString) -> Envelope<Identity> {
        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.execute(
            self.post("/auth")
                .query(&[("action", "login")])
                .json(&body),
        )
        .await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Envelope<Identity> {
        let body = RegisterBody {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.execute(
            self.post("/auth")
                .query(&[("action", "register")])
                .json(&body),
        )
        .await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_wishlist(&self, user_id: &UserId) -> Envelope<Vec<WishlistEntry>> {
        let envelope: Envelope<Vec<WishlistRow>> = self
            .execute(self.get("/wishlist").query(&[("user_id", user_id.as_str())]))
            .await;

        let fetched_at = Utc::now();
        envelope.map(|rows| {
            rows.into_iter()
                .map(|row| row.into_entry(fetched_at))
                .collect()
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    async fn toggle_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        action: WishlistAction,
    ) -> Envelope<Ack> {
        let body = ToggleBody {
            user_id,
            product_id,
            action,
        };
        self.execute(self.post("/wishlist").json(&body)).await
    }
}
