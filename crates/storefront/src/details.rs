//! Product detail view: a product with its reviews.

use lumina_core::{Identity, NewReview, Product, ProductId, Review};
use thiserror::Error;
use tracing::{debug, warn};

use crate::gateway::{GatewayError, RemoteGateway};

/// Star rating preselected in the review form.
pub const DEFAULT_REVIEW_RATING: u8 = 5;

/// Errors that can occur when submitting a review.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("sign in to write a review")]
    SignInRequired,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("review comment is empty")]
    EmptyComment,

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

/// A product and its reviews, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub reviews: Vec<Review>,
}

impl ProductDetails {
    /// Fetch the product and, once it is known to exist, its reviews.
    ///
    /// A failed review fetch leaves the list empty.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the product itself cannot be fetched.
    pub async fn load<G: RemoteGateway>(gateway: &G, id: &ProductId) -> Result<Self, GatewayError> {
        let product = gateway.get_product(id).await.into_result()?;

        let reviews = match gateway.list_reviews(id).await.into_result() {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(product_id = %id, error = %e, "Could not load reviews");
                Vec::new()
            }
        };
        debug!(product_id = %id, reviews = reviews.len(), "Loaded product details");

        Ok(Self { product, reviews })
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.product.in_stock()
    }

    /// Submit a review as `author` and prepend the created review.
    ///
    /// # Errors
    ///
    /// Fails without calling the service when there is no author, the rating
    /// is out of range or the comment is blank. Otherwise returns the gateway
    /// error if the service refuses the review.
    pub async fn submit_review<G: RemoteGateway>(
        &mut self,
        gateway: &G,
        author: Option<&Identity>,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ReviewError> {
        let author = author.ok_or(ReviewError::SignInRequired)?;
        if !(NewReview::MIN_RATING..=NewReview::MAX_RATING).contains(&rating) {
            return Err(ReviewError::InvalidRating(rating));
        }
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::EmptyComment);
        }

        let review = NewReview {
            product_id: self.product.id.clone(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            rating,
            comment: comment.to_string(),
        };
        let created = gateway.add_review(&review).await.into_result()?;
        debug!(product_id = %self.product.id, review_id = %created.id, "Review published");

        self.reviews.insert(0, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, identity, product, review};

    fn gateway_with_lamp() -> FakeGateway {
        let gateway = FakeGateway::default();
        gateway.seed_products(vec![product("1", "Desk Lamp", 4999, "Lighting")]);
        gateway.seed_review(review("r1", "1", "Bob D.", 4));
        gateway
    }

    #[tokio::test]
    async fn test_load_fetches_reviews() {
        let gateway = gateway_with_lamp();
        let details = ProductDetails::load(&gateway, &ProductId::new("1")).await.unwrap();
        assert_eq!(details.product.name, "Desk Lamp");
        assert_eq!(details.reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_product_skips_reviews() {
        let gateway = gateway_with_lamp();
        let err = ProductDetails::load(&gateway, &ProductId::new("404"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Rejected("Product not found".to_string()));
        assert_eq!(gateway.review_fetches(), 0);
    }

    #[tokio::test]
    async fn test_submit_prepends_review() {
        let gateway = gateway_with_lamp();
        let mut details = ProductDetails::load(&gateway, &ProductId::new("1")).await.unwrap();
        let ada = identity("7", "Ada");

        let created = details
            .submit_review(&gateway, Some(&ada), 5, "  Lovely light  ")
            .await
            .unwrap();
        assert_eq!(created.user_name, "Ada");
        assert_eq!(created.comment, "Lovely light");

        assert_eq!(details.reviews.len(), 2);
        assert_eq!(details.reviews[0].user_id, ada.id);
    }

    #[tokio::test]
    async fn test_submit_validates_before_calling_service() {
        let gateway = gateway_with_lamp();
        let mut details = ProductDetails::load(&gateway, &ProductId::new("1")).await.unwrap();
        let ada = identity("7", "Ada");

        assert!(matches!(
            details.submit_review(&gateway, None, 5, "Nice").await,
            Err(ReviewError::SignInRequired)
        ));
        assert!(matches!(
            details.submit_review(&gateway, Some(&ada), 6, "Nice").await,
            Err(ReviewError::InvalidRating(6))
        ));
        assert!(matches!(
            details.submit_review(&gateway, Some(&ada), 3, "   ").await,
            Err(ReviewError::EmptyComment)
        ));
        assert_eq!(details.reviews.len(), 1);
    }
}
