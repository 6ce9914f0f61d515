//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the catalog and cart.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, Stock};
