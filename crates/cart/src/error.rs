//! Errors returned by cart operations.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::storage::StorageError;

/// Why a cart operation did not change the cart.
///
/// Every variant is also reported to the user as a notice; the error is
/// returned so callers can branch on the outcome.
#[derive(Debug, Error)]
pub enum CartError {
    /// Not enough stock for the requested quantity.
    #[error("product {product_id} out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product has no entry in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Stock or product lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether the user can fix this by asking for fewer units.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        matches!(self, Self::OutOfStock { .. })
    }
}
