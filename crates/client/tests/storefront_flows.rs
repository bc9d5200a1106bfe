//! End-to-end client flows against an in-process mock backend.
//!
//! The mock speaks the same REST surface as the real backend (axum over a
//! random loopback port), so these tests exercise the full stack: token
//! attach, status mapping, session teardown, cart checkout, image caching.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};
use url::Url;

use clementine_client::{
    ApiError, ClientConfig, Notice, SessionEvent, Storefront,
};
use clementine_core::{Credentials, Product, ProductId};

// =============================================================================
// Mock backend
// =============================================================================

#[derive(Default)]
struct Backend {
    products: Vec<Value>,
    image_hits: AtomicUsize,
    /// Product ids whose update call should fail with a 500.
    fail_update_for: Vec<String>,
    updated: std::sync::Mutex<Vec<String>>,
}

fn product_json(id: &str, price: f64, stock: u32) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "description": "",
        "brand": "Acme",
        "price": price,
        "category": "misc",
        "releaseDate": "2025-03-01",
        "available": true,
        "stockQuantity": stock,
        "imageName": format!("{id}.png"),
        "imageType": "image/png"
    })
}

async fn list_products(State(backend): State<Arc<Backend>>) -> impl IntoResponse {
    axum::Json(backend.products.clone())
}

async fn search_products(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let keyword = params.get("keyword").cloned().unwrap_or_default().to_lowercase();
    let hits: Vec<Value> = backend
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&keyword)
        })
        .cloned()
        .collect();
    axum::Json(hits)
}

async fn get_product(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> impl IntoResponse {
    let Some(auth) = headers.get(header::AUTHORIZATION) else {
        return (StatusCode::UNAUTHORIZED, "Missing token".to_string()).into_response();
    };
    if !auth.to_str().unwrap_or_default().starts_with("Bearer ") {
        return (StatusCode::UNAUTHORIZED, "Bad token".to_string()).into_response();
    }
    backend
        .products
        .iter()
        .find(|p| p["id"] == id.as_str())
        .map_or_else(
            || (StatusCode::NOT_FOUND, "Product not found".to_string()).into_response(),
            |p| axum::Json(p.clone()).into_response(),
        )
}

async fn get_image(
    State(backend): State<Arc<Backend>>,
    AxumPath(id): AxumPath<String>,
) -> impl IntoResponse {
    backend.image_hits.fetch_add(1, Ordering::SeqCst);
    (
        [(header::CONTENT_TYPE, "image/png")],
        format!("png-bytes-for-{id}").into_bytes(),
    )
}

async fn update_product(
    State(backend): State<Arc<Backend>>,
    AxumPath(id): AxumPath<String>,
) -> impl IntoResponse {
    if backend.fail_update_for.contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write failed".to_string()).into_response();
    }
    backend.updated.lock().unwrap().push(id.clone());
    axum::Json(product_json(&id, 10.0, 4)).into_response()
}

async fn login(axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    if body["password"] == "hunter2" {
        (StatusCode::OK, "tok-login-1".to_string())
    } else {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".to_string(),
        )
    }
}

async fn register() -> impl IntoResponse {
    (StatusCode::CREATED, "Registration successful".to_string())
}

async fn always_unauthorized() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, "Token expired".to_string())
}

fn app(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/search", get(search_products))
        .route("/api/product/{id}", get(get_product).put(update_product))
        .route("/api/product/{id}/image", get(get_image))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .with_state(backend)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base: &str, state_dir: &Path) -> ClientConfig {
    ClientConfig {
        base_url: Url::parse(base).unwrap(),
        state_dir: state_dir.to_path_buf(),
        http_timeout: Duration::from_secs(5),
        auth_notice_cooldown: Duration::from_millis(3_000),
    }
}

async fn storefront_with(backend: Arc<Backend>) -> (tempfile::TempDir, Storefront) {
    let base = spawn(app(backend)).await;
    let dir = tempfile::tempdir().unwrap();
    let front = Storefront::new(&config(&base, dir.path())).unwrap();
    (dir, front)
}

fn sample_product(id: &str, stock: u32) -> Product {
    serde_json::from_value(product_json(id, 10.0, stock)).unwrap()
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn list_products_parses_backend_payload() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 19.99, 5), product_json("p2", 5.0, 0)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(backend).await;

    let products = front.catalog.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new("p1"));
    assert_eq!(products[0].stock_quantity, 5);
}

#[tokio::test]
async fn search_url_encodes_keyword() {
    let backend = Arc::new(Backend {
        products: vec![product_json("kbd", 80.0, 2)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(backend).await;

    // Space must survive the round trip through the query string;
    // the mock matches on the decoded keyword.
    let hits = front.catalog.search("product kbd").await.unwrap();
    assert_eq!(hits.len(), 1);

    let misses = front.catalog.search("no such thing").await.unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn get_product_attaches_bearer_token() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 19.99, 5)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(backend).await;

    front.tokens.set("tok-9").unwrap();
    let product = front.catalog.get_product(&ProductId::new("p1")).await.unwrap();
    assert_eq!(product.name, "Product p1");
}

#[tokio::test]
async fn missing_product_maps_to_validation_error() {
    let backend = Arc::new(Backend {
        products: vec![],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(backend).await;
    front.tokens.set("tok-9").unwrap();

    let err = front
        .catalog
        .get_product(&ProductId::new("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation { status: 404, ref message } if message == "Product not found"
    ));
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn login_stores_token_and_broadcasts() {
    let (_dir, front) = storefront_with(Arc::new(Backend::default())).await;
    let mut session_rx = front.events.subscribe_session();

    assert!(!front.auth.is_logged_in());
    front
        .auth
        .login(&Credentials::new("user@example.com", "hunter2"))
        .await
        .unwrap();

    assert!(front.auth.is_logged_in());
    assert_eq!(front.tokens.get().as_deref(), Some("tok-login-1"));
    assert_eq!(session_rx.try_recv().unwrap(), SessionEvent::SignedIn);

    front.auth.logout().unwrap();
    assert!(!front.auth.is_logged_in());
    assert_eq!(session_rx.try_recv().unwrap(), SessionEvent::SignedOut);
}

#[tokio::test]
async fn failed_login_does_not_tear_down_session() {
    let (_dir, front) = storefront_with(Arc::new(Backend::default())).await;

    // An existing session from some earlier login
    front.tokens.set("existing-token").unwrap();
    let mut notice_rx = front.events.subscribe_notices();

    let err = front
        .auth
        .login(&Credentials::new("user@example.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Auth));

    // Raw path: no teardown, no sign-in notice
    assert_eq!(front.tokens.get().as_deref(), Some("existing-token"));
    assert!(notice_rx.try_recv().is_err());
}

#[tokio::test]
async fn register_returns_confirmation_without_logging_in() {
    let (_dir, front) = storefront_with(Arc::new(Backend::default())).await;

    let message = front
        .auth
        .register(&Credentials::new("new@example.com", "s3cret!"))
        .await
        .unwrap();
    assert_eq!(message, "Registration successful");
    assert!(!front.auth.is_logged_in());
}

#[tokio::test]
async fn two_unauthorized_responses_produce_one_notice() {
    let router = Router::new()
        .route("/api/product/{id}", get(always_unauthorized))
        .with_state(Arc::new(Backend::default()));
    let base = spawn(router).await;
    let dir = tempfile::tempdir().unwrap();
    let front = Storefront::new(&config(&base, dir.path())).unwrap();

    front.tokens.set("stale-token").unwrap();
    let mut notice_rx = front.events.subscribe_notices();
    let mut session_rx = front.events.subscribe_session();

    let id = ProductId::new("p1");
    let first = front.catalog.get_product(&id).await.unwrap_err();
    let second = front.catalog.get_product(&id).await.unwrap_err();
    assert!(matches!(first, ApiError::Auth));
    assert!(matches!(second, ApiError::Auth));

    // Token cleared and session-changed broadcast exactly once
    assert_eq!(front.tokens.get(), None);
    assert_eq!(session_rx.try_recv().unwrap(), SessionEvent::SignedOut);
    assert!(session_rx.try_recv().is_err());

    // Cooldown window: a single sign-in notice for the burst
    assert_eq!(
        notice_rx.try_recv().unwrap(),
        Notice::SignInRequired { redirect: "/signin" }
    );
    assert!(notice_rx.try_recv().is_err());
}

// =============================================================================
// Image cache
// =============================================================================

#[tokio::test]
async fn image_cache_serves_repeat_resolves_without_refetch() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 19.99, 5)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(Arc::clone(&backend)).await;

    let id = ProductId::new("p1");
    let first = front.images.resolve(&id).await.unwrap();
    let second = front.images.resolve(&id).await.unwrap();

    assert_eq!(first.content_type, "image/png");
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(backend.image_hits.load(Ordering::SeqCst), 1);

    // Released entries are fetched again on the next resolve
    front.images.release(&id).await;
    front.images.resolve(&id).await.unwrap();
    assert_eq!(backend.image_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_resolves_for_one_id_share_a_single_fetch() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 19.99, 5)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(Arc::clone(&backend)).await;

    let id = ProductId::new("p1");
    let (first, second) = tokio::join!(front.images.resolve(&id), front.images.resolve(&id));

    assert_eq!(first.unwrap().bytes, second.unwrap().bytes);
    assert_eq!(backend.image_hits.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_commits_every_line_and_clears_cart() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 10.0, 5), product_json("p2", 3.0, 9)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(Arc::clone(&backend)).await;

    front.cart.add(&sample_product("p1", 5)).unwrap();
    front.cart.add(&sample_product("p1", 5)).unwrap();
    front.cart.add(&sample_product("p2", 9)).unwrap();

    let outcome = front.cart.checkout(&front.catalog).await.unwrap();
    assert!(outcome.is_complete());
    assert_eq!(
        outcome.committed,
        vec![ProductId::new("p1"), ProductId::new("p2")]
    );
    assert!(front.cart.snapshot().is_empty());
    assert_eq!(backend.updated.lock().unwrap().as_slice(), ["p1", "p2"]);
}

#[tokio::test]
async fn checkout_stops_at_first_failure_without_rollback() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 10.0, 5), product_json("p2", 3.0, 9)],
        fail_update_for: vec!["p2".to_string()],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(Arc::clone(&backend)).await;

    front.cart.add(&sample_product("p1", 5)).unwrap();
    front.cart.add(&sample_product("p2", 9)).unwrap();

    let outcome = front.cart.checkout(&front.catalog).await.unwrap();
    assert!(!outcome.is_complete());
    assert_eq!(outcome.committed, vec![ProductId::new("p1")]);

    let (failed_id, failed_err) = outcome.failed.unwrap();
    assert_eq!(failed_id, ProductId::new("p2"));
    assert!(matches!(failed_err, ApiError::Server { status: 500, .. }));

    // Committed line is gone, failed line survives for a retry
    let cart = front.cart.snapshot();
    assert_eq!(cart.len(), 1);
    assert!(cart.get(&ProductId::new("p2")).is_some());
}

#[tokio::test]
async fn checkout_prunes_lines_for_deleted_products() {
    let backend = Arc::new(Backend {
        products: vec![product_json("p1", 10.0, 5)],
        ..Backend::default()
    });
    let (_dir, front) = storefront_with(Arc::clone(&backend)).await;

    front.cart.add(&sample_product("p1", 5)).unwrap();
    // This product no longer exists on the backend
    front.cart.add(&sample_product("deleted", 4)).unwrap();

    let outcome = front.cart.checkout(&front.catalog).await.unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.committed, vec![ProductId::new("p1")]);
    assert!(front.cart.snapshot().is_empty());
}
