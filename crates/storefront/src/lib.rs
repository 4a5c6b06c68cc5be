//! Lumina storefront client library.
//!
//! This crate provides the storefront behaviour as a library: the gateway
//! to the remote CRUD service, the session, the cart and wishlist, catalog
//! filtering and the checkout flow. Views hold a [`Storefront`] and drive it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod details;
pub mod error;
pub mod gateway;
pub mod session;
pub mod shop;
pub mod store;
pub mod storefront;

#[cfg(test)]
mod testing;

pub use error::{AppError, Result};
pub use storefront::Storefront;
