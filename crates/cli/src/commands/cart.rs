//! Cart commands.

use std::io::Write;

use lumina_core::ProductId;
use lumina_storefront::gateway::RemoteGateway;
use lumina_storefront::shop::ShopAction;
use lumina_storefront::{AppError, Storefront};

use super::{CliError, find_product};

pub fn show<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let shop = storefront.shop();
    if shop.cart().is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    for line in shop.cart() {
        writeln!(
            out,
            "[{}] {:<32} {:>3} x {:>10} = {:>10}",
            line.product.id,
            line.product.name,
            line.quantity,
            line.product.price.to_string(),
            line.line_total().to_string()
        )?;
    }
    writeln!(out)?;
    writeln!(out, "{} item(s), total {}", shop.item_count(), shop.cart_total())?;
    Ok(())
}

pub async fn add<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    id: &str,
) -> Result<(), CliError> {
    let product = find_product(storefront, id).await?;
    if !product.in_stock() {
        writeln!(out, "{} is out of stock.", product.name)?;
        return Ok(());
    }
    writeln!(out, "Added {} to the cart.", product.name)?;
    storefront.dispatch(ShopAction::AddToCart(product));
    show(storefront, out)
}

fn require_line<G: RemoteGateway>(storefront: &Storefront<G>, id: &ProductId) -> Result<(), AppError> {
    if storefront.shop().cart().iter().any(|l| l.product_id() == id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Product {id} in cart")))
    }
}

pub fn remove<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    id: &str,
) -> Result<(), CliError> {
    let id = ProductId::new(id);
    require_line(storefront, &id)?;
    storefront.dispatch(ShopAction::RemoveFromCart(id));
    show(storefront, out)
}

pub fn set<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    id: &str,
    quantity: i64,
) -> Result<(), CliError> {
    let product_id = ProductId::new(id);
    require_line(storefront, &product_id)?;
    storefront.dispatch(ShopAction::UpdateQuantity {
        product_id,
        quantity,
    });
    show(storefront, out)
}

pub fn clear<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    storefront.dispatch(ShopAction::ClearCart);
    writeln!(out, "Cart cleared.")?;
    Ok(())
}
