//! Shop mutations as values.

use lumina_core::{Product, ProductId};

use super::ShopState;
use crate::error::add_breadcrumb;
use crate::gateway::RemoteGateway;

/// A single mutation of [`ShopState`].
///
/// The view layer funnels every cart and wishlist change through
/// [`ShopState::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShopAction {
    AddToCart(Product),
    RemoveFromCart(ProductId),
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    ToggleWishlist(Product),
    ClearCart,
    ClearWishlist,
}

impl ShopAction {
    /// Short name used for breadcrumbs and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "add_to_cart",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ToggleWishlist(_) => "toggle_wishlist",
            Self::ClearCart => "clear_cart",
            Self::ClearWishlist => "clear_wishlist",
        }
    }

    fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::AddToCart(product) | Self::ToggleWishlist(product) => Some(&product.id),
            Self::RemoveFromCart(product_id) | Self::UpdateQuantity { product_id, .. } => {
                Some(product_id)
            }
            Self::ClearCart | Self::ClearWishlist => None,
        }
    }
}

impl<G: RemoteGateway> ShopState<G> {
    /// Apply `action`.
    pub fn dispatch(&mut self, action: ShopAction) {
        let category = match &action {
            ShopAction::ToggleWishlist(_) | ShopAction::ClearWishlist => "wishlist",
            _ => "cart",
        };
        match action.product_id() {
            Some(id) => add_breadcrumb(category, action.name(), Some(&[("product_id", id.as_str())])),
            None => add_breadcrumb(category, action.name(), None),
        }
        tracing::debug!(action = action.name(), "Dispatching shop action");

        match action {
            ShopAction::AddToCart(product) => self.add_to_cart(product),
            ShopAction::RemoveFromCart(product_id) => self.remove_from_cart(&product_id),
            ShopAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(&product_id, quantity),
            ShopAction::ToggleWishlist(product) => {
                self.toggle_wishlist(product);
            }
            ShopAction::ClearCart => self.clear_cart(),
            ShopAction::ClearWishlist => self.clear_wishlist(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{FakeGateway, product};

    #[tokio::test]
    async fn test_dispatch_matches_direct_calls() {
        let mut shop = ShopState::restore(
            Arc::new(FakeGateway::default()),
            Arc::new(MemoryStore::new()),
            None,
        )
        .await;
        let lamp = product("1", "Desk Lamp", 4999, "Lighting");

        shop.dispatch(ShopAction::AddToCart(lamp.clone()));
        shop.dispatch(ShopAction::UpdateQuantity {
            product_id: lamp.id.clone(),
            quantity: 5,
        });
        shop.dispatch(ShopAction::ToggleWishlist(lamp.clone()));
        assert_eq!(shop.item_count(), 5);
        assert!(shop.is_wishlisted(&lamp.id));

        shop.dispatch(ShopAction::RemoveFromCart(lamp.id.clone()));
        shop.dispatch(ShopAction::ClearWishlist);
        assert!(shop.cart().is_empty());
        assert!(shop.wishlist().is_empty());
    }

    #[test]
    fn test_action_names() {
        assert_eq!(ShopAction::ClearCart.name(), "clear_cart");
        assert_eq!(
            ShopAction::RemoveFromCart(ProductId::new("1")).name(),
            "remove_from_cart"
        );
    }
}
