//! The cart store.
//!
//! Holds the current cart snapshot and applies the three cart operations.
//! Each operation is one transaction: read the snapshot, ask the inventory,
//! build the new cart, persist it, then publish it. If any step fails, both
//! the published snapshot and the persisted blob stay as they were.
//!
//! Operations are serialized by an async mutex held across the whole
//! transaction, so overlapping calls never lose each other's updates.

use std::sync::Arc;

use rocketshoes_core::{Cart, CartItem, ProductId, Stock};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::error::CartError;
use crate::inventory::{Inventory, InventoryError};
use crate::notice::{Locale, Notice, NoticeMessage, Notifier};
use crate::storage::{Storage, StorageError};

/// Storage key the cart has always been saved under.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Per-store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Key of the cart blob in storage
    pub key: String,
    /// Notice language
    pub locale: Locale,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            locale: Locale::default(),
        }
    }
}

/// Cart state container.
///
/// Exposes a read-only snapshot ([`cart`](Self::cart)), a subscription
/// ([`subscribe`](Self::subscribe)) and the operations
/// [`add_item`](Self::add_item), [`remove_item`](Self::remove_item) and
/// [`update_quantity`](Self::update_quantity).
pub struct CartStore<I> {
    inventory: I,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    settings: StoreSettings,
    snapshot: watch::Sender<Cart>,
    write_lock: Mutex<()>,
}

impl<I: Inventory> CartStore<I> {
    /// Open the store, loading the persisted cart if there is one.
    ///
    /// A persisted value that is not a valid cart is discarded with a
    /// warning and the store starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn open(
        inventory: I,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        settings: StoreSettings,
    ) -> Result<Self, StorageError> {
        let cart = match storage.get(&settings.key)? {
            Some(raw) => decode_cart(&settings.key, &raw),
            None => Cart::new(),
        };
        info!(key = %settings.key, items = cart.len(), "Cart loaded");

        let (snapshot, _) = watch::channel(cart);
        Ok(Self {
            inventory,
            storage,
            notifier,
            settings,
            snapshot,
            write_lock: Mutex::new(()),
        })
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// Observe every committed cart.
    ///
    /// The receiver starts at the current snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.subscribe()
    }

    /// Settings this store was opened with.
    #[must_use]
    pub const fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented if stock allows one more
    /// unit. A new product is fetched and appended with a quantity of one,
    /// provided at least one unit is in stock. Emits `Added` on success,
    /// `OutOfStock` when stock is short and `AddFailed` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().await;

        let result = self.try_add_item(product_id).await;
        match &result {
            Ok(()) => self.notify(NoticeMessage::Added),
            Err(e) if e.is_out_of_stock() => {
                warn!(error = %e, "Add rejected");
                self.notify(NoticeMessage::OutOfStock);
            }
            Err(e) => {
                error!(error = %e, "Failed to add product");
                self.notify(NoticeMessage::AddFailed);
            }
        }
        result
    }

    async fn try_add_item(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut cart = self.cart();
        let stock = self.fetch_stock(product_id).await?;

        if let Some(item) = cart.get(product_id) {
            if item.amount >= stock.amount {
                return Err(CartError::OutOfStock {
                    product_id,
                    requested: item.amount.saturating_add(1),
                    available: stock.amount,
                });
            }
            cart.increment(product_id);
        } else {
            if stock.amount < 1 {
                return Err(CartError::OutOfStock {
                    product_id,
                    requested: 1,
                    available: stock.amount,
                });
            }
            let product = self.inventory.product(product_id).await?;
            ensure_matches(product_id, product.id)?;
            cart.push(product);
        }

        self.commit(cart)
    }

    /// Remove a product's entry.
    ///
    /// Emits `RemoveFailed` if the product is not in the cart or the cart
    /// cannot be persisted. Success is silent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] or the storage failure.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().await;

        let mut cart = self.cart();
        let result = match cart.remove(product_id) {
            Some(_) => self.commit(cart),
            None => Err(CartError::NotInCart(product_id)),
        };

        if let Err(e) = &result {
            warn!(error = %e, "Failed to remove product");
            self.notify(NoticeMessage::RemoveFailed);
        }
        result
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// `amount` must be strictly below the available stock, otherwise
    /// `OutOfStock` is emitted. An `amount` below one is ignored without a
    /// notice. Any other failure emits `UpdateFailed`.
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged. Ignored amounts are
    /// not errors.
    #[instrument(skip_all, fields(product_id = %product_id, amount))]
    pub async fn update_quantity(&self, product_id: ProductId, amount: i64) -> Result<(), CartError> {
        let _guard = self.write_lock.lock().await;

        let result = self.try_update_quantity(product_id, amount).await;
        match &result {
            Ok(()) => {}
            Err(e) if e.is_out_of_stock() => {
                warn!(error = %e, "Quantity change rejected");
                self.notify(NoticeMessage::OutOfStock);
            }
            Err(e) => {
                error!(error = %e, "Failed to change quantity");
                self.notify(NoticeMessage::UpdateFailed);
            }
        }
        result
    }

    async fn try_update_quantity(&self, product_id: ProductId, amount: i64) -> Result<(), CartError> {
        let mut cart = self.cart();
        let stock = self.fetch_stock(product_id).await?;

        if amount >= i64::from(stock.amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: u32::try_from(amount).unwrap_or(u32::MAX),
                available: stock.amount,
            });
        }

        let new_amount = match u32::try_from(amount) {
            Ok(n) if n >= 1 => n,
            _ => {
                debug!(amount, "Ignoring quantity below one");
                return Ok(());
            }
        };

        if !cart.set_amount(product_id, new_amount) {
            return Err(CartError::NotInCart(product_id));
        }

        self.commit(cart)
    }

    async fn fetch_stock(&self, product_id: ProductId) -> Result<Stock, CartError> {
        let stock = self.inventory.stock(product_id).await?;
        ensure_matches(product_id, stock.id)?;
        Ok(stock)
    }

    /// Persist `cart`, then publish it as the current snapshot.
    fn commit(&self, cart: Cart) -> Result<(), CartError> {
        let encoded = serde_json::to_string(&cart).map_err(StorageError::from)?;
        self.storage.set(&self.settings.key, &encoded)?;

        debug!(items = cart.len(), units = cart.item_count(), "Cart committed");
        self.snapshot.send_replace(cart);
        Ok(())
    }

    fn notify(&self, message: NoticeMessage) {
        self.notifier.notify(Notice::new(message, self.settings.locale));
    }
}

fn ensure_matches(requested: ProductId, received: ProductId) -> Result<(), InventoryError> {
    if requested == received {
        Ok(())
    } else {
        Err(InventoryError::UnexpectedProduct {
            requested,
            received,
        })
    }
}

/// Decode a persisted cart.
///
/// Entries are decoded one at a time so a single bad entry only costs
/// itself. A value that is not a JSON array at all yields an empty cart.
fn decode_cart(key: &str, raw: &str) -> Cart {
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(key, error = %e, "Persisted cart is malformed, starting empty");
            return Cart::new();
        }
    };

    let stored = entries.len();
    let items: Vec<CartItem> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(key, index, error = %e, "Dropped unreadable entry from persisted cart");
                None
            }
        })
        .collect();

    let decoded = items.len();
    let cart = Cart::from_items(items);
    if cart.len() != decoded {
        warn!(
            key,
            dropped = decoded - cart.len(),
            "Dropped duplicate or empty entries from persisted cart"
        );
    }
    debug!(key, stored, kept = cart.len(), "Persisted cart decoded");
    cart
}
