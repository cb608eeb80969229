//! Integration test harness for the Shopfront client.
//!
//! [`MockBackend`] serves an in-process imitation of the storefront REST
//! API on an ephemeral port: JSON auth endpoints issuing bearer tokens,
//! a product catalog, multipart merchant mutations, and the dashboard.
//! [`TestContext`] pairs a backend with a [`Store`] over a scratch
//! storage directory so tests drive the real client end to end.
//!
//! The backend checks authentication only; whether a signed-in user may
//! reach merchant commands is the client guard's concern and is covered
//! by its own tests.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Route handlers must be async to satisfy axum's `Handler` trait even
// though the mock serves everything from memory.
#![allow(clippy::unused_async)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, Path as RoutePath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};
use url::Url;

use shopfront_client::{ClientConfig, Store};

/// A multipart field as the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        len: usize,
    },
}

struct Account {
    username: String,
    password: String,
    user: Value,
}

/// Shared state behind the mock routes.
struct BackendState {
    accounts: Mutex<Vec<Account>>,
    valid_access: Mutex<HashSet<String>>,
    valid_refresh: Mutex<HashSet<String>>,
    /// When set, every bearer token is rejected, even one minted by a
    /// refresh that just succeeded.
    reject_access: AtomicBool,
    refresh_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
    token_seq: AtomicUsize,
    product_seq: AtomicUsize,
    products: Mutex<Vec<Value>>,
    merchant_products: Mutex<Vec<Value>>,
    categories: Mutex<Vec<Value>>,
    stats: Mutex<Value>,
    last_parts: Mutex<Vec<ReceivedPart>>,
}

impl BackendState {
    fn new() -> Self {
        let accounts = vec![
            Account {
                username: "sam".to_owned(),
                password: "secret".to_owned(),
                user: json!({
                    "id": "u-sam",
                    "username": "sam",
                    "email": "sam@example.com",
                    "is_admin": false,
                    "is_customer": true,
                }),
            },
            Account {
                username: "meg".to_owned(),
                password: "secret".to_owned(),
                user: json!({
                    "id": "u-meg",
                    "username": "meg",
                    "email": "meg@example.com",
                    "is_admin": true,
                    "is_customer": false,
                }),
            },
        ];

        Self {
            accounts: Mutex::new(accounts),
            valid_access: Mutex::new(HashSet::new()),
            valid_refresh: Mutex::new(HashSet::new()),
            reject_access: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
            token_seq: AtomicUsize::new(0),
            product_seq: AtomicUsize::new(0),
            products: Mutex::new(Vec::new()),
            merchant_products: Mutex::new(Vec::new()),
            categories: Mutex::new(Vec::new()),
            stats: Mutex::new(json!({
                "total_revenue": "0",
                "total_orders": 0,
                "total_products": 0,
                "pending_orders": 0,
            })),
            last_parts: Mutex::new(Vec::new()),
        }
    }

    fn mint(&self, prefix: &str) -> String {
        let seq = self.token_seq.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{seq}")
    }

    fn issue_tokens(&self) -> (String, String) {
        let access = self.mint("access");
        let refresh = self.mint("refresh");
        self.valid_access
            .lock()
            .expect("access set lock poisoned")
            .insert(access.clone());
        self.valid_refresh
            .lock()
            .expect("refresh set lock poisoned")
            .insert(refresh.clone());
        (access, refresh)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.reject_access.load(Ordering::SeqCst) {
            return false;
        }
        bearer(headers).is_some_and(|token| {
            self.valid_access
                .lock()
                .expect("access set lock poisoned")
                .contains(&token)
        })
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToOwned::to_owned)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        "Authentication credentials were not provided.",
    )
        .into_response()
}

/// In-process mock of the storefront REST API.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::new());
        let router = router(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock backend address");
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock backend stopped unexpectedly");
        });
        Self {
            addr,
            state,
            server,
        }
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self, storage_dir: &Path) -> ClientConfig {
        ClientConfig {
            api_base: Url::parse(&format!("http://{}/api/", self.addr))
                .expect("Failed to build mock base URL"),
            storage_dir: storage_dir.to_path_buf(),
            http_timeout: Duration::from_secs(5),
        }
    }

    // =========================================================================
    // Scenario controls
    // =========================================================================

    /// Invalidate every issued access token. Refresh tokens stay valid, so
    /// the next authenticated request forces a refresh exchange.
    pub fn expire_access(&self) {
        self.state
            .valid_access
            .lock()
            .expect("access set lock poisoned")
            .clear();
    }

    /// Invalidate every issued refresh token.
    pub fn revoke_refresh(&self) {
        self.state
            .valid_refresh
            .lock()
            .expect("refresh set lock poisoned")
            .clear();
    }

    /// Reject every bearer token from now on, while the refresh endpoint
    /// keeps succeeding. Replayed requests keep failing with 401.
    pub fn reject_all_access(&self) {
        self.state.reject_access.store(true, Ordering::SeqCst);
    }

    /// Number of refresh exchanges served so far.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of catalog listing requests served so far.
    #[must_use]
    pub fn catalog_calls(&self) -> usize {
        self.state.catalog_calls.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// Add a product to the public catalog.
    pub fn seed_product(&self, product: Value) {
        self.state
            .products
            .lock()
            .expect("products lock poisoned")
            .push(product);
    }

    /// Replace the public catalog wholesale.
    pub fn replace_products(&self, products: Vec<Value>) {
        *self.state.products.lock().expect("products lock poisoned") = products;
    }

    /// Add a product to the merchant listing.
    pub fn seed_merchant_product(&self, product: Value) {
        self.state
            .merchant_products
            .lock()
            .expect("merchant products lock poisoned")
            .push(product);
    }

    /// The merchant listing as the backend currently holds it.
    #[must_use]
    pub fn merchant_products(&self) -> Vec<Value> {
        self.state
            .merchant_products
            .lock()
            .expect("merchant products lock poisoned")
            .clone()
    }

    /// Replace the category fixtures.
    pub fn seed_categories(&self, categories: Vec<Value>) {
        *self
            .state
            .categories
            .lock()
            .expect("categories lock poisoned") = categories;
    }

    /// Replace the dashboard stats payload.
    pub fn set_stats(&self, stats: Value) {
        *self.state.stats.lock().expect("stats lock poisoned") = stats;
    }

    /// The multipart fields of the most recent product mutation.
    #[must_use]
    pub fn last_parts(&self) -> Vec<ReceivedPart> {
        self.state
            .last_parts
            .lock()
            .expect("parts lock poisoned")
            .clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A backend plus a store wired to it over a scratch storage directory.
pub struct TestContext {
    pub backend: MockBackend,
    pub store: Store,
    storage_dir: tempfile::TempDir,
}

impl TestContext {
    /// Spawn a backend and open a fresh store against it.
    pub async fn new() -> Self {
        let backend = MockBackend::spawn().await;
        let storage_dir = tempfile::tempdir().expect("Failed to create scratch storage");
        let store =
            Store::open(backend.config(storage_dir.path())).expect("Failed to open store");
        Self {
            backend,
            store,
            storage_dir,
        }
    }

    /// The scratch storage directory backing the store.
    #[must_use]
    pub fn storage_path(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Open a second store over the same storage directory, as a process
    /// restart would.
    #[must_use]
    pub fn reopen_store(&self) -> Store {
        Store::open(self.backend.config(self.storage_dir.path())).expect("Failed to reopen store")
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: Arc<BackendState>) -> axum::Router {
    axum::Router::new()
        .route("/api/users/login/", post(login))
        .route("/api/users/register/", post(register))
        .route("/api/users/token/refresh/", post(refresh))
        .route("/api/products/", get(list_products).post(create_product))
        .route("/api/products/{id}", get(product_detail))
        .route("/api/products/{id}/", put(update_product).delete(delete_product))
        .route("/api/products/my-products/", get(my_products))
        .route("/api/products/categories/", get(list_categories))
        .route("/api/orders/merchant/dashboard-stats/", get(dashboard_stats))
        .with_state(state)
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();

    let user = {
        let accounts = state.accounts.lock().expect("accounts lock poisoned");
        accounts
            .iter()
            .find(|account| account.username == username && account.password == password)
            .map(|account| account.user.clone())
    };
    let Some(user) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            "No active account found with the given credentials",
        )
            .into_response();
    };

    let (access, refresh) = state.issue_tokens();
    Json(json!({ "user": user, "access": access, "refresh": refresh })).into_response()
}

async fn register(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    let username = body
        .get("username")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    if username.is_empty() {
        return (StatusCode::BAD_REQUEST, "This field may not be blank.").into_response();
    }

    let mut accounts = state.accounts.lock().expect("accounts lock poisoned");
    if accounts.iter().any(|account| account.username == username) {
        return (
            StatusCode::BAD_REQUEST,
            "A user with that username already exists.",
        )
            .into_response();
    }

    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let is_admin = body.get("is_admin").and_then(Value::as_bool).unwrap_or(false);
    let is_customer = body
        .get("is_customer")
        .and_then(Value::as_bool)
        .unwrap_or(!is_admin);

    let user = json!({
        "id": format!("u-{username}"),
        "username": username,
        "email": email,
        "is_admin": is_admin,
        "is_customer": is_customer,
    });
    accounts.push(Account {
        username,
        password,
        user: user.clone(),
    });
    drop(accounts);

    let (access, refresh) = state.issue_tokens();
    (
        StatusCode::CREATED,
        Json(json!({ "user": user, "access": access, "refresh": refresh })),
    )
        .into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let token = body.get("refresh").and_then(Value::as_str).unwrap_or_default();
    let valid = state
        .valid_refresh
        .lock()
        .expect("refresh set lock poisoned")
        .contains(token);
    if !valid {
        return (StatusCode::UNAUTHORIZED, "Token is invalid or expired").into_response();
    }

    let access = state.mint("access");
    state
        .valid_access
        .lock()
        .expect("access set lock poisoned")
        .insert(access.clone());
    Json(json!({ "access": access })).into_response()
}

async fn list_products(State(state): State<Arc<BackendState>>) -> Response {
    state.catalog_calls.fetch_add(1, Ordering::SeqCst);
    let products = state.products.lock().expect("products lock poisoned").clone();
    Json(products).into_response()
}

async fn product_detail(
    State(state): State<Arc<BackendState>>,
    RoutePath(id): RoutePath<String>,
) -> Response {
    let found = {
        let products = state.products.lock().expect("products lock poisoned");
        products
            .iter()
            .find(|product| product.get("id").and_then(Value::as_str) == Some(id.as_str()))
            .cloned()
    };
    match found {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "No Product matches the given query.",
        )
            .into_response(),
    }
}

async fn my_products(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let products = state
        .merchant_products
        .lock()
        .expect("merchant products lock poisoned")
        .clone();
    Json(products).into_response()
}

async fn create_product(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let parts = read_parts(multipart).await;
    *state.last_parts.lock().expect("parts lock poisoned") = parts.clone();

    let seq = state.product_seq.fetch_add(1, Ordering::SeqCst);
    let product = merchant_product_from_parts(&format!("mp-{seq}"), &parts);
    state
        .merchant_products
        .lock()
        .expect("merchant products lock poisoned")
        .push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(state): State<Arc<BackendState>>,
    RoutePath(id): RoutePath<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let parts = read_parts(multipart).await;
    *state.last_parts.lock().expect("parts lock poisoned") = parts.clone();

    let updated = {
        let mut products = state
            .merchant_products
            .lock()
            .expect("merchant products lock poisoned");
        let slot = products
            .iter_mut()
            .find(|product| product.get("id").and_then(Value::as_str) == Some(id.as_str()));
        slot.map(|slot| {
            let updated = merchant_product_from_parts(&id, &parts);
            *slot = updated.clone();
            updated
        })
    };
    match updated {
        Some(updated) => Json(updated).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "No Product matches the given query.",
        )
            .into_response(),
    }
}

async fn delete_product(
    State(state): State<Arc<BackendState>>,
    RoutePath(id): RoutePath<String>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let removed = {
        let mut products = state
            .merchant_products
            .lock()
            .expect("merchant products lock poisoned");
        let before = products.len();
        products
            .retain(|product| product.get("id").and_then(Value::as_str) != Some(id.as_str()));
        products.len() < before
    };
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            "No Product matches the given query.",
        )
            .into_response()
    }
}

async fn list_categories(State(state): State<Arc<BackendState>>) -> Response {
    let categories = state
        .categories
        .lock()
        .expect("categories lock poisoned")
        .clone();
    Json(categories).into_response()
}

async fn dashboard_stats(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let stats = state.stats.lock().expect("stats lock poisoned").clone();
    Json(stats).into_response()
}

async fn read_parts(mut multipart: Multipart) -> Vec<ReceivedPart> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .expect("Failed to read multipart field")
    {
        let name = field.name().unwrap_or_default().to_owned();
        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_owned();
            let bytes = field.bytes().await.expect("Failed to read file part");
            parts.push(ReceivedPart::File {
                name,
                file_name,
                len: bytes.len(),
            });
        } else {
            let value = field.text().await.expect("Failed to read text part");
            parts.push(ReceivedPart::Text { name, value });
        }
    }
    parts
}

/// Assemble the merchant product echoed back by create and update, the
/// way the real backend serializes one: category as its bare id, image
/// as a hosted media path.
fn merchant_product_from_parts(id: &str, parts: &[ReceivedPart]) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("id".to_owned(), json!(id));
    object.insert("image".to_owned(), Value::Null);
    for part in parts {
        match part {
            ReceivedPart::Text { name, value } => match name.as_str() {
                "title" | "description" | "price" => {
                    object.insert(name.clone(), json!(value));
                }
                "category" => {
                    let category: i64 = value.parse().unwrap_or_default();
                    object.insert("category".to_owned(), json!(category));
                }
                "stock" => {
                    let stock: u32 = value.parse().unwrap_or_default();
                    object.insert("stock".to_owned(), json!(stock));
                }
                _ => {}
            },
            ReceivedPart::File { name, file_name, .. } if name == "image" => {
                object.insert("image".to_owned(), json!(format!("/media/{file_name}")));
            }
            ReceivedPart::File { .. } => {}
        }
    }
    Value::Object(object)
}
