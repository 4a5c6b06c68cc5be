//! Checkout command.

use std::io::Write;

use lumina_core::CheckoutStatus;
use lumina_storefront::Storefront;
use lumina_storefront::checkout::ShippingDetails;
use lumina_storefront::gateway::RemoteGateway;

use super::CliError;

pub async fn submit<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    shipping: &ShippingDetails,
) -> Result<(), CliError> {
    let mut status = storefront.checkout_flow().subscribe();
    let progress = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            match *status.borrow_and_update() {
                CheckoutStatus::Processing => tracing::info!("Processing payment..."),
                _ => break,
            }
        }
    });

    let result = storefront.checkout(shipping).await;
    progress.abort();
    let receipt = result?;

    writeln!(out, "Order confirmed.")?;
    writeln!(out, "Reference: {}", receipt.reference)?;
    for line in &receipt.lines {
        writeln!(
            out,
            "  {} x {:<32} {:>10}",
            line.quantity,
            line.product.name,
            line.line_total().to_string()
        )?;
    }
    writeln!(out, "{} item(s), total {}", receipt.item_count, receipt.total)?;
    writeln!(out, "Thank you for your purchase.")?;
    Ok(())
}
