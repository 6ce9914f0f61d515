//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: [`FakeInventoryServer`] serves the
//! `stock/{id}` and `products/{id}` endpoints from memory on an ephemeral
//! local port, and the cart is persisted into a temporary directory.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

#[derive(Default)]
struct Catalog {
    stock: Mutex<HashMap<i32, u32>>,
    products: Mutex<HashMap<i32, Value>>,
    /// Bodies served verbatim, ahead of `products`.
    raw_products: Mutex<HashMap<i32, String>>,
    product_hits: AtomicUsize,
    stock_hits: AtomicUsize,
    /// Non-zero forces every stock request to answer with this status.
    stock_failure: AtomicU16,
}

/// In-memory stand-in for the inventory REST service.
///
/// The server is aborted when dropped.
pub struct FakeInventoryServer {
    addr: SocketAddr,
    catalog: Arc<Catalog>,
    handle: JoinHandle<()>,
}

impl FakeInventoryServer {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let catalog = Arc::new(Catalog::default());
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&catalog));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake inventory server");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake inventory address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            catalog,
            handle,
        }
    }

    /// Base URL to configure the client with.
    ///
    /// # Panics
    ///
    /// Never in practice; the address always forms a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Invalid fake inventory URL")
    }

    /// Set the available stock of a product.
    pub fn set_stock(&self, id: i32, amount: u32) {
        self.catalog
            .stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, amount);
    }

    /// Register a product record, priced the way the service sends it (a JSON
    /// number).
    pub fn set_product(&self, id: i32, title: &str, price: f64) {
        self.catalog
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                json!({
                    "id": id,
                    "title": title,
                    "price": price,
                    "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/{id}.jpg"),
                }),
            );
    }

    /// Answer `products/{id}` with `200 OK` and `body` as-is, valid JSON or
    /// not.
    pub fn set_product_body(&self, id: i32, body: &str) {
        self.catalog
            .raw_products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, body.to_string());
    }

    /// Make every stock request fail with `status` (0 to stop failing).
    pub fn fail_stock_with(&self, status: u16) {
        self.catalog.stock_failure.store(status, Ordering::SeqCst);
    }

    /// Number of `products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.catalog.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.catalog.stock_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeInventoryServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn stock(State(catalog): State<Arc<Catalog>>, Path(id): Path<i32>) -> Response {
    catalog.stock_hits.fetch_add(1, Ordering::SeqCst);

    let failure = catalog.stock_failure.load(Ordering::SeqCst);
    if failure != 0 {
        let status = StatusCode::from_u16(failure).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "inventory unavailable").into_response();
    }

    let amount = catalog
        .stock
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn product(State(catalog): State<Arc<Catalog>>, Path(id): Path<i32>) -> Response {
    catalog.product_hits.fetch_add(1, Ordering::SeqCst);

    let raw = catalog
        .raw_products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();
    if let Some(body) = raw {
        return ([(header::CONTENT_TYPE, "application/json")], body).into_response();
    }

    let record = catalog
        .products
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();
    match record {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
