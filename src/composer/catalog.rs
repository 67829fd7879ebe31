use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::clients::CatalogSource;
use crate::domain::{Product, ProductId};
use crate::error::CatalogError;

/// Immutable list of products fetched once per session.
///
/// Cloning is cheap; every clone shares the same product list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    products: Arc<[Product]>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Fetches the product list from `source`.
    ///
    /// # Errors
    /// Returns `CatalogError::Unavailable` when the source cannot be reached
    /// or answers with something that is not a product list.
    #[instrument(name = "catalog_load", skip(source))]
    pub async fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        match source.fetch_products().await {
            Ok(products) => {
                info!(product_count = products.len(), "Catalog loaded");
                Ok(Self::new(products))
            }
            Err(e) => {
                warn!(error = %e, "Catalog load failed");
                Err(e)
            }
        }
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring match on the product name, as used by the
    /// product picker.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> + 'a {
        let needle = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(move |p| p.name.to_lowercase().contains(&needle))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
