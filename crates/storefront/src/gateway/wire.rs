//! Request bodies and raw response rows exchanged with the CRUD service.

use chrono::{DateTime, NaiveDateTime, Utc};
use lumina_core::{Product, ProductId, UserId, WishlistEntry};
use serde::{Deserialize, Serialize};

use super::WishlistAction;

/// Timestamp format of the relational store's `DATETIME` columns.
const STORE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
pub(super) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ToggleBody<'a> {
    pub user_id: &'a UserId,
    pub product_id: &'a ProductId,
    pub action: WishlistAction,
}

/// A wishlist row: the joined product plus the row's insertion time.
#[derive(Debug, Deserialize)]
pub(super) struct WishlistRow {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub added_at: Option<String>,
}

impl WishlistRow {
    /// Convert into an entry, using `fetched_at` when the row has no usable timestamp.
    pub fn into_entry(self, fetched_at: DateTime<Utc>) -> WishlistEntry {
        let added_at = self
            .added_at
            .as_deref()
            .and_then(parse_store_timestamp)
            .unwrap_or(fetched_at);
        WishlistEntry::new(self.product, added_at)
    }
}

fn parse_store_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, STORE_DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const ROW: &str = r#"{"id":"5","name":"Noise Cancelling Headphones","description":"",
        "price":299.99,"category":"Electronics","image":"","rating":4.9,"stock":15"#;

    #[test]
    fn test_row_uses_store_timestamp() {
        let row: WishlistRow =
            serde_json::from_str(&format!(r#"{ROW},"added_at":"2024-03-02 08:15:00"}}"#)).unwrap();
        let entry = row.into_entry(Utc::now());
        assert_eq!(
            entry.added_at,
            Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_row_without_timestamp_uses_fetch_time() {
        let fetched_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let row: WishlistRow = serde_json::from_str(&format!("{ROW}}}")).unwrap();
        assert_eq!(row.into_entry(fetched_at).added_at, fetched_at);
    }

    #[test]
    fn test_toggle_body_keys() {
        let user_id = UserId::new("4");
        let product_id = ProductId::new("2");
        let body = serde_json::to_value(ToggleBody {
            user_id: &user_id,
            product_id: &product_id,
            action: WishlistAction::Remove,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"userId": "4", "productId": "2", "action": "remove"})
        );
    }
}
