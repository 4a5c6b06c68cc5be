//! Wishlist commands.

use std::io::Write;

use lumina_storefront::Storefront;
use lumina_storefront::gateway::{RemoteGateway, WishlistAction};
use lumina_storefront::shop::{ShopAction, SyncOutcome};

use super::{CliError, find_product};

pub fn show<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let wishlist = storefront.shop().wishlist();
    if wishlist.is_empty() {
        writeln!(out, "Your wishlist is empty.")?;
        return Ok(());
    }
    for entry in wishlist {
        writeln!(
            out,
            "[{}] {:<32} {:>10}  added {}",
            entry.product.id,
            entry.product.name,
            entry.product.price.to_string(),
            entry.added_at.format("%Y-%m-%d")
        )?;
    }
    if storefront.identity().is_none() {
        writeln!(out)?;
        writeln!(out, "Sign in to keep your wishlist across devices.")?;
    }
    Ok(())
}

pub async fn toggle<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
    id: &str,
) -> Result<(), CliError> {
    let product = find_product(storefront, id).await?;
    let name = product.name.clone();
    let product_id = product.id.clone();
    storefront.dispatch(ShopAction::ToggleWishlist(product));

    if storefront.shop().is_wishlisted(&product_id) {
        writeln!(out, "Added {name} to the wishlist.")?;
    } else {
        writeln!(out, "Removed {name} from the wishlist.")?;
    }
    Ok(())
}

pub async fn refresh<G: RemoteGateway>(
    storefront: &mut Storefront<G>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if storefront.identity().is_none() {
        writeln!(out, "Not signed in; the wishlist is local only.")?;
        return Ok(());
    }
    storefront.refresh_wishlist().await?;
    show(storefront, out)
}

/// Print failed remote writes. Local state is kept either way.
pub fn report_outcomes(out: &mut impl Write, outcomes: &[SyncOutcome]) -> Result<(), CliError> {
    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            let verb = match outcome.action {
                WishlistAction::Add => "save",
                WishlistAction::Remove => "remove",
            };
            writeln!(
                out,
                "Warning: could not {verb} product {} in your account wishlist: {e}",
                outcome.product_id
            )?;
        }
    }
    Ok(())
}
