//! Lumina Core - Shared domain types.
//!
//! This crate provides the types used across all Lumina components:
//! - `storefront` - Client library (gateway, session, cart, wishlist, checkout)
//! - `cli` - Command-line view layer over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere,
//! including in the stub service used by the integration tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, emails, catalog and shop entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
