//! RocketShoes Cart - stock-checked cart state with local persistence.
//!
//! # Architecture
//!
//! [`CartStore`] owns the cart snapshot and exposes the three cart
//! operations. Everything it talks to is injected:
//!
//! - [`Inventory`] - stock and product lookups ([`HttpInventory`] in
//!   production)
//! - [`Storage`] - synchronous key/value persistence of the cart blob
//!   ([`FileStorage`], [`MemoryStorage`])
//! - [`Notifier`] - fire-and-forget user notices ([`TracingNotifier`],
//!   [`ChannelNotifier`])
//!
//! UI layers observe the cart through [`CartStore::subscribe`], a
//! `tokio::sync::watch` receiver that sees every committed snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocketshoes_cart::{CartConfig, CartStore, FileStorage, HttpInventory, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::open(
//!     HttpInventory::new(&config.inventory)?,
//!     Arc::new(FileStorage::new(&config.storage_dir)),
//!     Arc::new(TracingNotifier),
//!     config.store_settings(),
//! )?;
//!
//! store.add_item(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inventory;
pub mod notice;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{CartConfig, ConfigError, InventoryConfig};
pub use error::CartError;
pub use inventory::{HttpInventory, Inventory, InventoryError};
pub use notice::{ChannelNotifier, Locale, Notice, NoticeLevel, NoticeMessage, Notifier, TracingNotifier};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CartStore, DEFAULT_STORAGE_KEY, StoreSettings};

pub use rocketshoes_core::{Cart, CartItem, Price, Product, ProductId, Stock};
