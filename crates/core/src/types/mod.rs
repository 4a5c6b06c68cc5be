//! Core types for Lumina.
//!
//! This module provides type-safe wrappers for the storefront's domain.

pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod product;
pub mod shop;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, Role};
pub use price::{Price, PriceError};
pub use product::{NewReview, Product, Review};
pub use shop::{CartLine, WishlistEntry};
pub use status::CheckoutStatus;
