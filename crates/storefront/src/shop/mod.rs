//! Shop State: the cart and the wishlist.
//!
//! # Architecture
//!
//! - Single owner, mutated through `&mut self` or [`ShopState::dispatch`]
//! - Every mutation is mirrored to local storage under its own key
//! - Wishlist toggles apply locally first; for an authenticated owner the
//!   remote write is queued on a per-product lane (see [`sync`])
//! - Identity changes replace the wishlist: the server copy on sign-in, empty
//!   on sign-out

mod action;
mod sync;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use lumina_core::{CartLine, Identity, Price, Product, ProductId, UserId, WishlistEntry};
use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, RemoteGateway, WishlistAction};
use crate::store::{LocalStore, keys, load_json, save_json};

pub use action::ShopAction;
pub use sync::{SyncOutcome, WishlistSync};

/// Cart and wishlist for one client.
pub struct ShopState<G> {
    cart: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    /// Identity the wishlist currently belongs to.
    owner: Option<UserId>,
    store: Arc<dyn LocalStore>,
    sync: WishlistSync<G>,
}

impl<G: RemoteGateway> ShopState<G> {
    /// Restore the persisted cart and wishlist, then adopt `identity`.
    ///
    /// The cart is always restored. The stored wishlist is only used when no
    /// identity is active; otherwise it is replaced by the server copy.
    pub async fn restore(
        gateway: Arc<G>,
        store: Arc<dyn LocalStore>,
        identity: Option<&Identity>,
    ) -> Self {
        let cart: Vec<CartLine> = load_json(store.as_ref(), keys::CART).unwrap_or_default();
        let wishlist: Vec<WishlistEntry> = if identity.is_none() {
            load_json(store.as_ref(), keys::WISHLIST).unwrap_or_default()
        } else {
            Vec::new()
        };
        debug!(
            cart_lines = cart.len(),
            wishlist_entries = wishlist.len(),
            "Restored shop state"
        );

        let mut shop = Self {
            cart,
            wishlist,
            owner: None,
            store,
            sync: WishlistSync::new(gateway),
        };

        if let Err(e) = shop.sync_identity(identity).await {
            warn!(error = %e, "Could not load remote wishlist; starting empty");
        }
        shop
    }

    // =========================================================================
    // Cart
    // =========================================================================

    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    /// Add one unit of `product`, merging into an existing line.
    pub fn add_to_cart(&mut self, product: Product) {
        if let Some(line) = self.cart.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.cart.push(CartLine::new(product));
        }
        self.persist_cart();
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        let before = self.cart.len();
        self.cart.retain(|l| l.product_id() != product_id);
        if self.cart.len() != before {
            self.persist_cart();
        }
    }

    /// Set the quantity of a line. Anything below 1 removes the line; an id
    /// not in the cart is ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove_from_cart(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.set_quantity(product_id, quantity);
    }

    fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if let Some(line) = self.cart.iter_mut().find(|l| l.product_id() == product_id) {
            line.quantity = quantity;
            self.persist_cart();
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist_cart();
    }

    /// Sum of `price * quantity` over every line.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over every line.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    #[must_use]
    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|e| e.product_id() == product_id)
    }

    /// Flip wishlist membership of `product`. Returns the new membership.
    ///
    /// The local flip is applied immediately. When the wishlist belongs to an
    /// identity, the matching remote write is queued; its outcome is reported
    /// through [`flush`](Self::flush) and never rolls the flip back.
    pub fn toggle_wishlist(&mut self, product: Product) -> bool {
        let product_id = product.id.clone();
        let member = if self.is_wishlisted(&product_id) {
            self.wishlist.retain(|e| e.product_id() != &product_id);
            false
        } else {
            self.wishlist.push(WishlistEntry::new(product, Utc::now()));
            true
        };
        self.persist_wishlist();

        if let Some(owner) = &self.owner {
            self.sync
                .enqueue(owner.clone(), product_id, WishlistAction::for_membership(member));
        }
        member
    }

    pub fn clear_wishlist(&mut self) {
        self.wishlist.clear();
        self.persist_wishlist();
    }

    /// Apply an identity transition.
    ///
    /// Any change of identity discards the current wishlist. Signing in then
    /// loads the server copy; signing out leaves it empty. Re-applying the
    /// current identity does nothing.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the server copy cannot be fetched. The
    /// wishlist is left empty in that case.
    pub async fn sync_identity(&mut self, identity: Option<&Identity>) -> Result<(), GatewayError> {
        let next = identity.map(|i| i.id.clone());
        if next == self.owner {
            return Ok(());
        }
        // Writes queued for the previous owner still land under that owner
        self.sync.drain().await;
        self.owner = next;
        self.clear_wishlist();

        if self.owner.is_some() {
            self.refresh_wishlist().await
        } else {
            info!("Signed out; cleared wishlist");
            Ok(())
        }
    }

    /// Replace the wishlist with the server copy for the current owner.
    ///
    /// Queued remote writes are awaited first so the fetched copy reflects
    /// them; their outcomes are returned by the next [`flush`](Self::flush).
    /// Anonymous wishlists have no server copy and are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the fetch fails; the wishlist is left
    /// unchanged.
    pub async fn refresh_wishlist(&mut self) -> Result<(), GatewayError> {
        let Some(owner) = self.owner.clone() else {
            return Ok(());
        };

        self.sync.drain().await;
        let entries = self.sync.gateway().get_wishlist(&owner).await.into_result()?;

        let mut seen = HashSet::new();
        self.wishlist = entries
            .into_iter()
            .filter(|e| seen.insert(e.product_id().clone()))
            .collect();
        info!(
            user_id = %owner,
            entries = self.wishlist.len(),
            "Loaded remote wishlist"
        );
        self.persist_wishlist();
        Ok(())
    }

    // =========================================================================
    // Remote sync
    // =========================================================================

    /// Remote wishlist writes not yet reported.
    #[must_use]
    pub const fn pending_sync(&self) -> usize {
        self.sync.pending()
    }

    /// Wait for every queued remote wishlist write and return the outcomes
    /// not yet reported, including those awaited by a refresh.
    pub async fn flush(&mut self) -> Vec<SyncOutcome> {
        self.sync.flush().await
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist_cart(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::CART, &self.cart) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn persist_wishlist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::WISHLIST, &self.wishlist) {
            warn!(error = %e, "Failed to persist wishlist");
        }
    }
}
