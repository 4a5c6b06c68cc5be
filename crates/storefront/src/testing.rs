//! In-memory gateway and fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use lumina_core::{
    Email, Identity, NewReview, Price, Product, ProductId, Review, ReviewId, Role, UserId,
    WishlistEntry,
};
use secrecy::{ExposeSecret, SecretString};

use crate::gateway::{Ack, Envelope, RemoteGateway, WishlistAction};

pub fn identity(id: &str, name: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        name: name.to_string(),
        email: Email::parse(&format!("{}@example.com", name.to_lowercase())).unwrap(),
        role: Role::User,
    }
}

pub fn product(id: &str, name: &str, cents: i64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Price::from_cents(cents).unwrap(),
        category: category.to_string(),
        image: String::new(),
        rating: 4.5,
        stock: 10,
    }
}

pub fn review(id: &str, product_id: &str, user_name: &str, rating: u8) -> Review {
    Review {
        id: ReviewId::new(id),
        product_id: ProductId::new(product_id),
        user_id: UserId::new("u101"),
        user_name: user_name.to_string(),
        rating,
        comment: "Great light".to_string(),
        date: NaiveDate::from_ymd_opt(2023, 10, 15).unwrap(),
    }
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    reviews: Vec<Review>,
    review_fetches: usize,
    /// email -> (password, identity)
    accounts: HashMap<String, (String, Identity)>,
    wishlists: HashMap<UserId, Vec<Product>>,
    toggles: Vec<(UserId, ProductId, WishlistAction)>,
}

/// A [`RemoteGateway`] backed by in-memory state.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
    toggle_delays: HashMap<WishlistAction, Duration>,
    fail_toggles: bool,
    fail_wishlist_fetch: AtomicBool,
}

impl FakeGateway {
    /// Delay every toggle of kind `action` before it is applied.
    pub fn with_toggle_delay(mut self, action: WishlistAction, delay: Duration) -> Self {
        self.toggle_delays.insert(action, delay);
        self
    }

    /// Record toggles but answer each with a connection error.
    pub const fn failing_toggles(mut self) -> Self {
        self.fail_toggles = true;
        self
    }

    pub fn failing_wishlist_fetch(self) -> Self {
        self.set_wishlist_fetch_failing(true);
        self
    }

    /// Switch wishlist fetch failures on or off after construction.
    pub fn set_wishlist_fetch_failing(&self, failing: bool) {
        self.fail_wishlist_fetch.store(failing, Ordering::SeqCst);
    }

    pub fn seed_products(&self, products: Vec<Product>) {
        self.state.lock().unwrap().products = products;
    }

    pub fn seed_review(&self, review: Review) {
        self.state.lock().unwrap().reviews.push(review);
    }

    pub fn seed_wishlist(&self, user_id: &UserId, products: Vec<Product>) {
        self.state
            .lock()
            .unwrap()
            .wishlists
            .insert(user_id.clone(), products);
    }

    pub fn seed_account(&self, identity: &Identity, password: &str) {
        self.state.lock().unwrap().accounts.insert(
            identity.email.to_string(),
            (password.to_string(), identity.clone()),
        );
    }

    pub fn toggles(&self) -> Vec<(UserId, ProductId, WishlistAction)> {
        self.state.lock().unwrap().toggles.clone()
    }

    pub fn remote_wishlist_ids(&self, user_id: &UserId) -> Vec<ProductId> {
        self.state
            .lock()
            .unwrap()
            .wishlists
            .get(user_id)
            .map(|products| products.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn review_fetches(&self) -> usize {
        self.state.lock().unwrap().review_fetches
    }
}

impl RemoteGateway for FakeGateway {
    async fn list_products(&self) -> Envelope<Vec<Product>> {
        Envelope::ok(self.state.lock().unwrap().products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Envelope<Product> {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .map_or_else(|| Envelope::failure("Product not found"), Envelope::ok)
    }

    async fn list_reviews(&self, product_id: &ProductId) -> Envelope<Vec<Review>> {
        let mut state = self.state.lock().unwrap();
        state.review_fetches += 1;
        Envelope::ok(
            state
                .reviews
                .iter()
                .filter(|r| &r.product_id == product_id)
                .cloned()
                .collect(),
        )
    }

    async fn add_review(&self, review: &NewReview) -> Envelope<Review> {
        let mut state = self.state.lock().unwrap();
        let created = Review {
            id: ReviewId::new(format!("r{}", state.reviews.len() + 1)),
            product_id: review.product_id.clone(),
            user_id: review.user_id.clone(),
            user_name: review.user_name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            date: Utc::now().date_naive(),
        };
        state.reviews.push(created.clone());
        Envelope::ok(created)
    }

    async fn login(&self, email: &Email, password: &SecretString) -> Envelope<Identity> {
        let state = self.state.lock().unwrap();
        match state.accounts.get(email.as_str()) {
            Some((stored, identity)) if stored == password.expose_secret() => {
                Envelope::ok(identity.clone())
            }
            Some(_) => Envelope::failure("Wrong password"),
            None => Envelope::failure("Email not found"),
        }
    }

    async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Envelope<Identity> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email.as_str()) {
            return Envelope::failure("Email already exists");
        }
        let identity = Identity {
            id: UserId::new((state.accounts.len() + 1).to_string()),
            name: name.to_string(),
            email: email.clone(),
            role: Role::User,
        };
        state.accounts.insert(
            email.to_string(),
            (password.expose_secret().to_string(), identity.clone()),
        );
        Envelope::ok(identity)
    }

    async fn get_wishlist(&self, user_id: &UserId) -> Envelope<Vec<WishlistEntry>> {
        if self.fail_wishlist_fetch.load(Ordering::SeqCst) {
            return Envelope::connection_error();
        }
        let state = self.state.lock().unwrap();
        let now = Utc::now();
        Envelope::ok(
            state
                .wishlists
                .get(user_id)
                .into_iter()
                .flatten()
                .map(|p| WishlistEntry::new(p.clone(), now))
                .collect(),
        )
    }

    async fn toggle_wishlist(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        action: WishlistAction,
    ) -> Envelope<Ack> {
        if let Some(delay) = self.toggle_delays.get(&action) {
            tokio::time::sleep(*delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state
            .toggles
            .push((user_id.clone(), product_id.clone(), action));
        if self.fail_toggles {
            return Envelope::connection_error();
        }

        let product = state.products.iter().find(|p| &p.id == product_id).cloned();
        let rows = state.wishlists.entry(user_id.clone()).or_default();
        match action {
            WishlistAction::Add => {
                if !rows.iter().any(|p| &p.id == product_id) {
                    // Products not seeded are stored as a placeholder row
                    rows.push(product.unwrap_or_else(|| {
                        self::product(product_id.as_str(), product_id.as_str(), 0, "")
                    }));
                }
            }
            WishlistAction::Remove => rows.retain(|p| &p.id != product_id),
        }
        Envelope::ok(Ack)
    }
}
