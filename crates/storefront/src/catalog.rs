//! Catalog filtering over a fetched product list.
//!
//! Pure functions; no network, no ranking, no pagination. The category filter
//! is an exact match and the text filter a case-insensitive substring match on
//! the product name. Both must hold.

use std::collections::HashSet;
use std::fmt;

use lumina_core::Product;

/// Label of the sentinel meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All";

/// Category restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a user-facing label. Only the exact label `All` means no
    /// restriction; anything else is a category name.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(label.to_string())
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The selectable categories for `products`: the sentinel first, then each
/// distinct category in first-appearance order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<CategoryFilter> {
    let mut seen = HashSet::new();
    std::iter::once(CategoryFilter::All)
        .chain(
            products
                .iter()
                .filter(|p| seen.insert(p.category.as_str()))
                .map(|p| CategoryFilter::Named(p.category.clone())),
        )
        .collect()
}

/// Category and text restriction applied together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFilter {
    pub category: CategoryFilter,
    /// Matched against product names, ignoring case. Empty matches everything.
    pub search: String,
}

impl CatalogFilter {
    #[must_use]
    pub fn new(category: CategoryFilter, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.matches(product)
            && product
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }

    /// The products passing the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// A filtered view of the catalog, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    /// Categories derived from the unfiltered list.
    pub categories: Vec<CategoryFilter>,
    pub filter: CatalogFilter,
    pub products: Vec<Product>,
}

impl CatalogPage {
    #[must_use]
    pub fn build(products: &[Product], filter: CatalogFilter) -> Self {
        Self {
            categories: categories(products),
            products: filter.apply(products).into_iter().cloned().collect(),
            filter,
        }
    }
}
