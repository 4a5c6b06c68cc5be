//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod wishlist;

use std::io;

use lumina_core::{Product, ProductId};
use lumina_storefront::gateway::RemoteGateway;
use lumina_storefront::{AppError, Storefront};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    App(#[from] AppError),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

/// Fetch a product by id.
pub async fn find_product<G: RemoteGateway>(
    storefront: &Storefront<G>,
    id: &str,
) -> Result<Product, AppError> {
    let id = ProductId::new(id);
    match storefront.gateway().get_product(&id).await.into_result() {
        Ok(product) => Ok(product),
        Err(e) if e.is_connection_error() => Err(e.into()),
        Err(_) => Err(AppError::NotFound(format!("Product {id}"))),
    }
}
