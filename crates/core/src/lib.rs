//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types used across all RocketShoes components:
//! - `cart` - The cart store, its inventory client and local persistence
//! - `cli` - Command-line front end for the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere, including UI layers that only render cart snapshots.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
