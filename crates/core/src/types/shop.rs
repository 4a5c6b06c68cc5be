//! Cart lines and wishlist entries.
//!
//! Both embed a full [`Product`] snapshot so the cart and wishlist can be
//! rendered and restored from local storage without a catalog round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// A cart entry pairing a product snapshot with a positive quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// A new line holding a single unit.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// A wishlisted product and the moment it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
    #[must_use]
    pub const fn new(product: Product, added_at: DateTime<Utc>) -> Self {
        Self { product, added_at }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }
}
