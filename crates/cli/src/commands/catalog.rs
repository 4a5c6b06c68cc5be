//! Catalog commands.

use std::io::Write;

use lumina_core::ProductId;
use lumina_storefront::Storefront;
use lumina_storefront::catalog::{CatalogFilter, CategoryFilter};
use lumina_storefront::details::ProductDetails;
use lumina_storefront::gateway::RemoteGateway;

use super::CliError;

/// List products, optionally filtered.
pub async fn list<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<(), CliError> {
    let filter = CatalogFilter::new(
        category.map(CategoryFilter::from_label).unwrap_or_default(),
        search.unwrap_or_default(),
    );
    let page = storefront.catalog(filter).await?;

    let labels: Vec<&str> = page.categories.iter().map(CategoryFilter::label).collect();
    writeln!(out, "Categories: {}", labels.join(" | "))?;
    writeln!(out)?;

    if page.products.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }
    for product in &page.products {
        let wished = if storefront.shop().is_wishlisted(&product.id) {
            "♥"
        } else {
            " "
        };
        writeln!(
            out,
            "{wished} [{}] {:<32} {:>10}  {} ({:.1}★)",
            product.id,
            product.name,
            product.price.to_string(),
            product.category,
            product.rating
        )?;
    }
    Ok(())
}

fn write_details(out: &mut impl Write, details: &ProductDetails, wished: bool) -> Result<(), CliError> {
    let product = &details.product;
    writeln!(out, "{} [{}]", product.name, product.id)?;
    writeln!(out, "{}  {:.1}★  {}", product.price, product.rating, product.category)?;
    writeln!(
        out,
        "{}{}",
        if details.in_stock() { "In Stock" } else { "Out of Stock" },
        if wished { "  ♥ in wishlist" } else { "" }
    )?;
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }

    writeln!(out)?;
    writeln!(out, "Reviews ({})", details.reviews.len())?;
    if details.reviews.is_empty() {
        writeln!(out, "  No reviews yet.")?;
    }
    for review in &details.reviews {
        writeln!(
            out,
            "  {} {}/5  {}",
            review.date, review.rating, review.user_name
        )?;
        writeln!(out, "    {}", review.comment)?;
    }
    Ok(())
}

/// Show a product with its reviews.
pub async fn show<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
    id: &str,
) -> Result<(), CliError> {
    let id = ProductId::new(id);
    let details = storefront.product(&id).await?;
    write_details(out, &details, storefront.shop().is_wishlisted(&id))
}

/// Publish a review as the signed-in user.
pub async fn review<G: RemoteGateway>(
    storefront: &Storefront<G>,
    out: &mut impl Write,
    id: &str,
    rating: u8,
    comment: &str,
) -> Result<(), CliError> {
    let id = ProductId::new(id);
    let mut details = storefront.product(&id).await?;
    let created = storefront.submit_review(&mut details, rating, comment).await?;
    writeln!(out, "Review {} published.", created.id)?;
    writeln!(out)?;
    write_details(out, &details, storefront.shop().is_wishlisted(&id))
}
