//! Catalog records served by the inventory service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as returned by `GET products/{id}`.
///
/// Everything except `id` is display data the cart carries along untouched,
/// so a record missing any of it still decodes with empty defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Unit price.
    #[serde(default)]
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

/// Available quantity of a product, as returned by `GET stock/{id}`.
///
/// Stock is fetched fresh for every cart mutation and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product identifier.
    pub id: ProductId,
    /// Units available for sale.
    pub amount: u32,
}
