//! Cart commands.
//!
//! Each command opens the store against the configured inventory service and
//! file storage, runs one operation, and logs the resulting cart. Notices go
//! through the tracing notifier, so the log is what the user reads.

use std::sync::Arc;

use rocketshoes_cart::{
    Cart, CartConfig, CartError, CartStore, FileStorage, HttpInventory, ProductId,
    TracingNotifier,
};
use tracing::info;

/// Open the cart store described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the persisted cart
/// cannot be read.
pub fn open_store(
    config: &CartConfig,
) -> Result<CartStore<HttpInventory>, Box<dyn std::error::Error>> {
    let inventory = HttpInventory::new(&config.inventory)?;
    let storage = FileStorage::new(&config.storage_dir);
    info!(
        api = %config.inventory.base_url,
        storage = %storage.path_for(&config.storage_key).display(),
        "Opening cart"
    );

    Ok(CartStore::open(
        inventory,
        Arc::new(storage),
        Arc::new(TracingNotifier),
        config.store_settings(),
    )?)
}

/// Log the current cart.
pub fn show(store: &CartStore<HttpInventory>) {
    log_cart(&store.cart());
}

/// Add one unit of `product_id`.
///
/// # Errors
///
/// Returns the reason the cart was left unchanged.
pub async fn add(store: &CartStore<HttpInventory>, product_id: ProductId) -> Result<(), CartError> {
    store.add_item(product_id).await?;
    log_cart(&store.cart());
    Ok(())
}

/// Remove `product_id` from the cart.
///
/// # Errors
///
/// Returns the reason the cart was left unchanged.
pub async fn remove(
    store: &CartStore<HttpInventory>,
    product_id: ProductId,
) -> Result<(), CartError> {
    store.remove_item(product_id).await?;
    log_cart(&store.cart());
    Ok(())
}

/// Set the quantity of `product_id`.
///
/// # Errors
///
/// Returns the reason the cart was left unchanged.
pub async fn update(
    store: &CartStore<HttpInventory>,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CartError> {
    store.update_quantity(product_id, amount).await?;
    log_cart(&store.cart());
    Ok(())
}

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    for item in cart {
        info!(
            product_id = %item.id(),
            "{} x {} ({} each) = {}",
            item.amount,
            item.product.title,
            item.product.price,
            item.subtotal()
        );
    }
    info!(
        products = cart.len(),
        units = cart.item_count(),
        "Total: {}",
        cart.total()
    );
}
