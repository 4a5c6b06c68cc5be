//! The storefront context handed to the view layer.
//!
//! Bundles the gateway, local storage, session and shop state. Identity
//! transitions made here drive the shop's wishlist protocol, so callers never
//! have to keep the two in step themselves.

use std::sync::Arc;
use std::time::Duration;

use lumina_core::{Identity, ProductId, Review};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::catalog::{CatalogFilter, CatalogPage};
use crate::checkout::{Checkout, CheckoutReceipt, ShippingDetails};
use crate::config::StorefrontConfig;
use crate::details::ProductDetails;
use crate::error::Result;
use crate::gateway::{RemoteGateway, StorefrontClient};
use crate::session::{AuthError, Session, validate_login, validate_registration};
use crate::shop::{ShopAction, ShopState, SyncOutcome};
use crate::store::{FileStore, LocalStore};

/// Everything a storefront view needs.
pub struct Storefront<G> {
    gateway: Arc<G>,
    store: Arc<dyn LocalStore>,
    session: Session,
    shop: ShopState<G>,
    checkout: Checkout,
}

impl Storefront<StorefrontClient> {
    /// Open a storefront against the configured service, persisting to the
    /// configured data directory.
    pub async fn from_config(config: &StorefrontConfig) -> Self {
        let gateway = Arc::new(StorefrontClient::new(&config.api));
        let store = Arc::new(FileStore::new(&config.data_dir));
        tracing::debug!(data_dir = %store.dir().display(), "Using local store");
        Self::open(gateway, store, config.checkout_delay).await
    }
}

impl<G: RemoteGateway> Storefront<G> {
    /// Resume the persisted session and shop state.
    pub async fn open(gateway: Arc<G>, store: Arc<dyn LocalStore>, checkout_delay: Duration) -> Self {
        let session = Session::restore(store.as_ref());
        let shop = ShopState::restore(Arc::clone(&gateway), Arc::clone(&store), session.identity()).await;
        Self {
            gateway,
            store,
            session,
            shop,
            checkout: Checkout::new(checkout_delay),
        }
    }

    #[must_use]
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    #[must_use]
    pub const fn shop(&self) -> &ShopState<G> {
        &self.shop
    }

    #[must_use]
    pub const fn checkout_flow(&self) -> &Checkout {
        &self.checkout
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in and load the account's wishlist.
    ///
    /// # Errors
    ///
    /// [`AuthError`] when the form is invalid or the service refuses the
    /// credentials.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<&Identity> {
        let email = validate_login(email, password)?;
        let identity = self
            .gateway
            .login(&email, password)
            .await
            .into_result()
            .map_err(AuthError::from)?;
        Ok(self.adopt(identity).await)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// [`AuthError`] when the form is invalid or the service refuses the
    /// registration.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<&Identity> {
        let (name, email) = validate_registration(name, email, password)?;
        let identity = self
            .gateway
            .register(name, &email, password)
            .await
            .into_result()
            .map_err(AuthError::from)?;
        Ok(self.adopt(identity).await)
    }

    async fn adopt(&mut self, identity: Identity) -> &Identity {
        let identity = self.session.establish(identity, self.store.as_ref());
        if let Err(e) = self.shop.sync_identity(Some(identity)).await {
            warn!(error = %e, "Signed in without a wishlist");
        }
        identity
    }

    /// Sign out. The cart, the wishlist and the identity are cleared together.
    pub async fn logout(&mut self) -> Option<Identity> {
        self.shop.clear_cart();
        let previous = self.session.clear(self.store.as_ref());
        if let Err(e) = self.shop.sync_identity(None).await {
            warn!(error = %e, "Sign-out left remote state unsettled");
        }
        previous
    }

    // =========================================================================
    // Shop
    // =========================================================================

    pub fn dispatch(&mut self, action: ShopAction) {
        self.shop.dispatch(action);
    }

    /// Re-read the signed-in wishlist from the service.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the fetch fails.
    pub async fn refresh_wishlist(&mut self) -> Result<()> {
        Ok(self.shop.refresh_wishlist().await?)
    }

    /// Fetch the catalog and apply `filter`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the product list cannot be fetched.
    pub async fn catalog(&self, filter: CatalogFilter) -> Result<CatalogPage> {
        let products = self.gateway.list_products().await.into_result()?;
        info!(products = products.len(), "Fetched catalog");
        Ok(CatalogPage::build(&products, filter))
    }

    /// Fetch one product with its reviews.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the product cannot be fetched.
    pub async fn product(&self, id: &ProductId) -> Result<ProductDetails> {
        Ok(ProductDetails::load(self.gateway.as_ref(), id).await?)
    }

    /// Publish a review for `details` as the signed-in identity.
    ///
    /// # Errors
    ///
    /// [`ReviewError`](crate::details::ReviewError) on invalid input, a
    /// missing identity or a service refusal.
    pub async fn submit_review(
        &self,
        details: &mut ProductDetails,
        rating: u8,
        comment: &str,
    ) -> Result<Review> {
        Ok(details
            .submit_review(self.gateway.as_ref(), self.session.identity(), rating, comment)
            .await?)
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// [`CheckoutError`](crate::checkout::CheckoutError) when the submission
    /// is rejected.
    pub async fn checkout(&mut self, shipping: &ShippingDetails) -> Result<CheckoutReceipt> {
        Ok(self.checkout.submit(&mut self.shop, shipping).await?)
    }

    /// Wait for queued wishlist writes and return their outcomes.
    pub async fn flush(&mut self) -> Vec<SyncOutcome> {
        self.shop.flush().await
    }

    /// Close the storefront once every queued wishlist write has completed.
    pub async fn close(mut self) -> Vec<SyncOutcome> {
        self.flush().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::CategoryFilter;
    use crate::error::AppError;
    use crate::store::MemoryStore;
    use crate::testing::{FakeGateway, identity, product};

    fn gateway() -> Arc<FakeGateway> {
        let gateway = FakeGateway::default();
        gateway.seed_products(vec![
            product("a", "Desk Lamp", 1000, "Lighting"),
            product("b", "Plant Stand", 500, "Home"),
            product("c", "Mechanical Keyboard", 12950, "Electronics"),
        ]);
        gateway.seed_account(&identity("7", "Ada"), "hunter22");
        Arc::new(gateway)
    }

    async fn open(gateway: &Arc<FakeGateway>, store: &Arc<MemoryStore>) -> Storefront<FakeGateway> {
        Storefront::open(Arc::clone(gateway), store.clone(), Duration::ZERO).await
    }

    #[tokio::test]
    async fn test_login_replaces_anonymous_wishlist() {
        let gateway = gateway();
        gateway.seed_wishlist(
            &identity("7", "Ada").id,
            vec![product("c", "Keyboard", 12950, "Electronics")],
        );
        let store = Arc::new(MemoryStore::new());
        let mut storefront = open(&gateway, &store).await;

        storefront.dispatch(ShopAction::ToggleWishlist(product("a", "Desk Lamp", 1000, "Lighting")));
        storefront.dispatch(ShopAction::ToggleWishlist(product("b", "Plant Stand", 500, "Home")));

        let ada = storefront
            .login("ada@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap();
        assert_eq!(ada.name, "Ada");

        let ids: Vec<_> = storefront
            .shop()
            .wishlist()
            .iter()
            .map(|e| e.product_id().to_string())
            .collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_session_anonymous() {
        let gateway = gateway();
        let store = Arc::new(MemoryStore::new());
        let mut storefront = open(&gateway, &store).await;

        let err = storefront
            .login("ada@example.com", &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Wrong password");
        assert!(!storefront.session().is_authenticated());

        let err = storefront
            .login("not-an-email", &SecretString::from("hunter22"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let gateway = gateway();
        let store = Arc::new(MemoryStore::new());
        let mut storefront = open(&gateway, &store).await;
        storefront
            .login("ada@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap();
        storefront.dispatch(ShopAction::AddToCart(product("a", "Desk Lamp", 1000, "Lighting")));
        storefront.dispatch(ShopAction::ToggleWishlist(product("b", "Plant Stand", 500, "Home")));
        storefront.flush().await;

        let previous = storefront.logout().await;
        assert_eq!(previous.map(|i| i.name), Some("Ada".to_string()));
        assert!(storefront.identity().is_none());
        assert!(storefront.shop().cart().is_empty());
        assert!(storefront.shop().wishlist().is_empty());

        // Remote copy is untouched by sign-out
        assert_eq!(gateway.remote_wishlist_ids(&identity("7", "Ada").id).len(), 1);
    }

    #[tokio::test]
    async fn test_session_resumes_across_restarts() {
        let gateway = gateway();
        let store = Arc::new(MemoryStore::new());
        {
            let mut storefront = open(&gateway, &store).await;
            storefront
                .login("ada@example.com", &SecretString::from("hunter22"))
                .await
                .unwrap();
            storefront.dispatch(ShopAction::AddToCart(product("a", "Desk Lamp", 1000, "Lighting")));
            storefront.dispatch(ShopAction::ToggleWishlist(product("c", "Keyboard", 12950, "Electronics")));
            assert_eq!(storefront.close().await.len(), 1);
        }

        let storefront = open(&gateway, &store).await;
        assert_eq!(storefront.identity().map(|i| i.name.as_str()), Some("Ada"));
        assert_eq!(storefront.shop().item_count(), 1);
        assert!(storefront.shop().is_wishlisted(&ProductId::new("c")));
    }

    #[tokio::test]
    async fn test_register_then_review() {
        let gateway = gateway();
        let store = Arc::new(MemoryStore::new());
        let mut storefront = open(&gateway, &store).await;

        storefront
            .register("Grace", "grace@example.com", &SecretString::from("cobol"))
            .await
            .unwrap();
        let err = storefront
            .register("Grace", "grace@example.com", &SecretString::from("cobol"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Email already exists");

        let mut details = storefront.product(&ProductId::new("a")).await.unwrap();
        let review = storefront
            .submit_review(&mut details, 4, "Warm light")
            .await
            .unwrap();
        assert_eq!(review.user_name, "Grace");
    }

    #[tokio::test]
    async fn test_catalog_and_checkout() {
        let gateway = gateway();
        let store = Arc::new(MemoryStore::new());
        let mut storefront = open(&gateway, &store).await;

        let page = storefront
            .catalog(CatalogFilter::new(CategoryFilter::from_label("Electronics"), "key"))
            .await
            .unwrap();
        assert_eq!(page.products.len(), 1);
        storefront.dispatch(ShopAction::AddToCart(page.products[0].clone()));

        let receipt = storefront
            .checkout(&ShippingDetails {
                address: "1 Via Roma".to_string(),
                city: "Torino".to_string(),
                postal_code: "10121".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.item_count, 1);
        assert!(storefront.shop().cart().is_empty());
    }
}
