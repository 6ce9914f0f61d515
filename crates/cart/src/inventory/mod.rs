//! Inventory service: stock levels and product records.
//!
//! # Architecture
//!
//! - The cart store depends on the [`Inventory`] trait, never on HTTP
//! - [`HttpInventory`] talks to the REST service (`GET stock/{id}`,
//!   `GET products/{id}`)
//! - Stock is authoritative at the moment of each call and is never cached;
//!   product records are cached for a configurable TTL via `moka`

mod http;

pub use http::HttpInventory;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The product (or its stock record) does not exist.
    #[error("Not found: {resource}/{id}")]
    NotFound {
        resource: &'static str,
        id: ProductId,
    },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Service answered with a product or stock record for a different product.
    #[error("Requested product {requested} but received {received}")]
    UnexpectedProduct {
        requested: ProductId,
        received: ProductId,
    },

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Source of stock levels and product records.
pub trait Inventory: Send + Sync {
    /// Current available quantity of a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Catalog record of a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, InventoryError>> + Send;
}
