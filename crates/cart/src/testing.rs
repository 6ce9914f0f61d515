//! Test doubles for the store's collaborators.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::{Cart, CartItem, Price, Product, ProductId, Stock};
use rust_decimal::Decimal;

use crate::inventory::{Inventory, InventoryError};
use crate::notice::{Notice, NoticeMessage, Notifier};
use crate::storage::{Storage, StorageError};

/// A catalog record for `id` priced at R$ 100,00.
pub fn product(id: i32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Tênis {id}"),
        price: Price::new(Decimal::new(10_000, 2)).unwrap_or_default(),
        image: format!("https://example.com/{id}.jpg"),
    }
}

/// Persisted JSON for a cart of `(id, amount)` entries.
pub fn cart_json(items: &[(i32, u32)]) -> String {
    let cart = Cart::from_items(
        items
            .iter()
            .map(|&(id, amount)| CartItem {
                product: product(id),
                amount,
            })
            .collect(),
    );
    serde_json::to_string(&cart).unwrap_or_default()
}

#[derive(Default)]
struct FakeInventoryState {
    stock: HashMap<ProductId, Stock>,
    products: HashMap<ProductId, Product>,
}

/// In-memory inventory. Unknown ids answer `NotFound`.
#[derive(Clone, Default)]
pub struct FakeInventory {
    state: Arc<Mutex<FakeInventoryState>>,
    product_calls: Arc<AtomicUsize>,
}

impl FakeInventory {
    pub fn set_stock(&self, id: i32, amount: u32) {
        let id = ProductId::new(id);
        self.with_state(|s| s.stock.insert(id, Stock { id, amount }));
    }

    /// Answer `stock/{id}` with `stock`, whatever its own id is.
    pub fn set_stock_as(&self, id: i32, stock: Stock) {
        self.with_state(|s| s.stock.insert(ProductId::new(id), stock));
    }

    pub fn set_product(&self, product: Product) {
        self.with_state(|s| s.products.insert(product.id, product));
    }

    /// Answer `products/{id}` with `product`, whatever its own id is.
    pub fn set_product_as(&self, id: i32, product: Product) {
        self.with_state(|s| s.products.insert(ProductId::new(id), product));
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeInventoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl Inventory for FakeInventory {
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock = self.with_state(|s| s.stock.get(&id).copied());
        // Yield so overlapping operations actually interleave.
        tokio::task::yield_now().await;
        stock.ok_or(InventoryError::NotFound {
            resource: "stock",
            id,
        })
    }

    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        let product = self.with_state(|s| s.products.get(&id).cloned());
        tokio::task::yield_now().await;
        product.ok_or(InventoryError::NotFound {
            resource: "products",
            id,
        })
    }
}

/// Collects every notice it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<NoticeMessage> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

fn denied(path: &str) -> StorageError {
    StorageError::Io {
        path: PathBuf::from(path),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    }
}

/// Storage whose reads fail.
pub struct FailingStorage;

impl Storage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(denied("unreadable"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(denied("unreadable"))
    }
}

/// Storage that reads as empty and rejects writes.
pub struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(denied("read-only"))
    }
}
