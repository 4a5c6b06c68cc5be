//! Catalog entities: products and their reviews.
//!
//! The remote store is the source of truth for both; the client never
//! mutates a [`Product`], it only snapshots it into cart lines and wishlist
//! entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Price, ProductId, ReviewId, UserId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Free-text category label, matched exactly by the catalog filter.
    pub category: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Average rating between 0 and 5.
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub stock: u32,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A published product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub user_name: String,
    /// Star rating between 1 and 5.
    #[serde(deserialize_with = "lenient::number")]
    pub rating: u8,
    pub comment: String,
    pub date: NaiveDate,
}

/// A review as submitted by the client, before the store assigns an id and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// Lowest accepted star rating.
    pub const MIN_RATING: u8 = 1;
    /// Highest accepted star rating.
    pub const MAX_RATING: u8 = 5;
}

/// Deserializers tolerant of numeric columns sent as strings.
///
/// Rows read straight from the relational store (reviews in particular) carry
/// `"5"` where a number is expected.
mod lenient {
    use core::fmt::Display;
    use core::str::FromStr;

    use serde::{Deserialize, Deserializer, de};

    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString<T> {
            Number(T),
            Text(String),
        }

        match NumberOrString::<T>::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}
