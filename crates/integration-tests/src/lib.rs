//! Integration tests for Lumina.
//!
//! The tests drive the storefront library over real HTTP against
//! [`StubServer`], an in-process stand-in for the CRUD service that answers
//! with the same envelopes and row shapes the deployed service produces.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lumina-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use lumina_storefront::config::ApiConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// How the stub misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    /// `500` with a JSON failure envelope.
    ServerError,
    /// `200` with a body that is not JSON.
    Garbage,
}

/// A recorded `POST /wishlist` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCall {
    pub user_id: String,
    pub product_id: String,
    pub action: String,
}

#[derive(Default)]
struct StubState {
    products: Vec<Value>,
    reviews: Vec<Value>,
    /// email -> (password, user row)
    users: HashMap<String, (String, Value)>,
    /// user id -> (product id, added at)
    wishlist: HashMap<String, Vec<(String, String)>>,
    toggles: Vec<ToggleCall>,
    fault: Fault,
    add_delay: Duration,
}

type Shared = Arc<Mutex<StubState>>;

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The demo catalog.
#[must_use]
pub fn demo_products() -> Vec<Value> {
    vec![
        json!({"id": "1", "name": "Minimalist Desk Lamp", "description": "A sleek, modern desk lamp.",
               "price": 49.99, "category": "Lighting", "image": "https://picsum.photos/400/400?random=1",
               "rating": 4.5, "stock": 12}),
        json!({"id": "2", "name": "Ergonomic Office Chair", "description": "Lumbar support and mesh.",
               "price": 249.0, "category": "Furniture", "image": "https://picsum.photos/400/400?random=2",
               "rating": 4.8, "stock": 5}),
        json!({"id": "3", "name": "Wireless Mechanical Keyboard", "description": "65% layout.",
               "price": 129.5, "category": "Electronics", "image": "https://picsum.photos/400/400?random=3",
               "rating": 4.7, "stock": 20}),
        json!({"id": "4", "name": "Ceramic Coffee Set", "description": "Four mugs and a pot.",
               "price": 85.0, "category": "Home", "image": "https://picsum.photos/400/400?random=4",
               "rating": 4.2, "stock": 0}),
        json!({"id": "5", "name": "Noise Cancelling Headphones", "description": "30-hour battery.",
               "price": 299.99, "category": "Electronics", "image": "https://picsum.photos/400/400?random=5",
               "rating": 4.9, "stock": 15}),
    ]
}

/// In-process CRUD service stub bound to an ephemeral port.
pub struct StubServer {
    addr: SocketAddr,
    suffix: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Start a stub serving `/products`, `/reviews`, `/auth` and `/wishlist`.
    pub async fn start() -> Self {
        Self::start_with_suffix("").await
    }

    /// Start a stub whose endpoints carry `suffix`, e.g. `/products.php`.
    pub async fn start_with_suffix(suffix: &str) -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState {
            products: demo_products(),
            ..StubState::default()
        }));

        let app = Router::new()
            .route(&format!("/products{suffix}"), get(products))
            .route(&format!("/reviews{suffix}"), get(list_reviews).post(add_review))
            .route(&format!("/auth{suffix}"), axum::routing::post(auth))
            .route(&format!("/wishlist{suffix}"), get(get_wishlist).post(toggle_wishlist))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        Self {
            addr,
            suffix: suffix.to_string(),
            state,
            handle,
        }
    }

    /// Client configuration pointing at this stub.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        let base = url::Url::parse(&format!("http://{}/", self.addr)).expect("Invalid stub URL");
        ApiConfig {
            base_url: base,
            endpoint_suffix: self.suffix.clone(),
        }
    }

    pub fn set_fault(&self, fault: Fault) {
        lock(&self.state).fault = fault;
    }

    /// Delay every `add` wishlist toggle before it is applied.
    pub fn set_add_delay(&self, delay: Duration) {
        lock(&self.state).add_delay = delay;
    }

    pub fn add_user(&self, id: &str, name: &str, email: &str, password: &str) {
        lock(&self.state).users.insert(
            email.to_string(),
            (
                password.to_string(),
                json!({"id": id, "name": name, "email": email, "role": "user"}),
            ),
        );
    }

    pub fn add_wishlist_row(&self, user_id: &str, product_id: &str) {
        lock(&self.state)
            .wishlist
            .entry(user_id.to_string())
            .or_default()
            .push((product_id.to_string(), "2024-03-02 08:15:00".to_string()));
    }

    /// An existing review, stored the way the relational store returns it.
    pub fn add_review_row(&self, product_id: &str, user_name: &str, rating: u8, comment: &str) {
        let mut state = lock(&self.state);
        let id = (state.reviews.len() + 1).to_string();
        state.reviews.push(json!({
            "id": id, "product_id": product_id, "user_id": "101", "user_name": user_name,
            "rating": rating.to_string(), "comment": comment, "date": "2023-10-15",
        }));
    }

    #[must_use]
    pub fn toggles(&self) -> Vec<ToggleCall> {
        lock(&self.state).toggles.clone()
    }

    #[must_use]
    pub fn wishlist_product_ids(&self, user_id: &str) -> Vec<String> {
        lock(&self.state)
            .wishlist
            .get(user_id)
            .map(|rows| rows.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn injected(state: &StubState) -> Option<Response> {
    match state.fault {
        Fault::None => None,
        Fault::ServerError => Some(failure(StatusCode::INTERNAL_SERVER_ERROR, "SQLSTATE[HY000]")),
        Fault::Garbage => Some((StatusCode::OK, "<b>Warning</b>: mysql down").into_response()),
    }
}

#[derive(Deserialize)]
struct ProductQuery {
    id: Option<String>,
}

async fn products(State(state): State<Shared>, Query(query): Query<ProductQuery>) -> Response {
    let state = lock(&state);
    if let Some(fault) = injected(&state) {
        return fault;
    }
    match query.id {
        Some(id) => state
            .products
            .iter()
            .find(|p| p["id"] == id.as_str())
            .map_or_else(
                || failure(StatusCode::OK, "Product not found"),
                |p| ok(p.clone()),
            ),
        None => ok(Value::Array(state.products.clone())),
    }
}

#[derive(Deserialize)]
struct ReviewQuery {
    product_id: Option<String>,
}

async fn list_reviews(State(state): State<Shared>, Query(query): Query<ReviewQuery>) -> Response {
    let state = lock(&state);
    if let Some(fault) = injected(&state) {
        return fault;
    }
    let Some(product_id) = query.product_id else {
        return ok(Value::Null);
    };
    let rows: Vec<Value> = state
        .reviews
        .iter()
        .rev()
        .filter(|r| r["product_id"] == product_id.as_str())
        .map(|r| {
            let mut row = r.clone();
            row["productId"] = r["product_id"].clone();
            row["userId"] = r["user_id"].clone();
            row["userName"] = r["user_name"].clone();
            row
        })
        .collect();
    ok(Value::Array(rows))
}

async fn add_review(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    if let Some(fault) = injected(&state) {
        return fault;
    }
    if body.get("productId").is_none() || body.get("userId").is_none() {
        return failure(StatusCode::OK, "Missing required fields");
    }
    let id = (state.reviews.len() + 1).to_string();
    state.reviews.push(json!({
        "id": id, "product_id": body["productId"], "user_id": body["userId"],
        "user_name": body["userName"], "rating": body["rating"].to_string(),
        "comment": body["comment"], "date": "2025-01-01",
    }));
    ok(json!({
        "id": id, "productId": body["productId"], "userId": body["userId"],
        "userName": body["userName"], "rating": body["rating"], "comment": body["comment"],
        "date": "2025-01-01",
    }))
}

#[derive(Deserialize)]
struct AuthQuery {
    action: Option<String>,
}

async fn auth(
    State(state): State<Shared>,
    Query(query): Query<AuthQuery>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Some(fault) = injected(&state) {
        return fault;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    match query.action.as_deref() {
        Some("register") => {
            let Some(name) = body["name"].as_str() else {
                return failure(StatusCode::OK, "Incomplete data");
            };
            if state.users.contains_key(&email) {
                return failure(StatusCode::OK, "Email already exists");
            }
            let id = (state.users.len() + 100).to_string();
            let user = json!({"id": id, "name": name, "email": email, "role": "user"});
            state.users.insert(email, (password, user.clone()));
            ok(user)
        }
        Some("login") => match state.users.get(&email) {
            None => failure(StatusCode::OK, "Debug: Email non trovata nel database."),
            Some((stored, user)) if *stored == password => ok(user.clone()),
            Some(_) => failure(StatusCode::OK, "Debug: Password errata."),
        },
        _ => ok(Value::Null),
    }
}

#[derive(Deserialize)]
struct WishlistQuery {
    user_id: Option<String>,
}

async fn get_wishlist(State(state): State<Shared>, Query(query): Query<WishlistQuery>) -> Response {
    let state = lock(&state);
    if let Some(fault) = injected(&state) {
        return fault;
    }
    let Some(user_id) = query.user_id else {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "User ID required");
    };
    let rows: Vec<Value> = state
        .wishlist
        .get(&user_id)
        .into_iter()
        .flatten()
        .filter_map(|(product_id, added_at)| {
            let mut row = state
                .products
                .iter()
                .find(|p| p["id"] == product_id.as_str())?
                .clone();
            row["added_at"] = Value::String(added_at.clone());
            Some(row)
        })
        .collect();
    ok(Value::Array(rows))
}

async fn toggle_wishlist(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let action = body["action"].as_str().unwrap_or_default().to_string();
    let delay = lock(&state).add_delay;
    if action == "add" && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut state = lock(&state);
    let (Some(user_id), Some(product_id)) = (body["userId"].as_str(), body["productId"].as_str())
    else {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Missing data");
    };
    let call = ToggleCall {
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
        action: action.clone(),
    };
    state.toggles.push(call);
    if let Some(fault) = injected(&state) {
        return fault;
    }

    let rows = state.wishlist.entry(user_id.to_string()).or_default();
    match action.as_str() {
        "add" => {
            if !rows.iter().any(|(id, _)| id == product_id) {
                rows.push((product_id.to_string(), "2025-01-01 12:00:00".to_string()));
            }
            Json(json!({"success": true, "message": "Added"})).into_response()
        }
        "remove" => {
            rows.retain(|(id, _)| id != product_id);
            Json(json!({"success": true, "message": "Removed"})).into_response()
        }
        _ => ok(Value::Null),
    }
}
