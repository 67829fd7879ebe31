use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::CatalogSource;
use crate::domain::{Product, ProductId};
use crate::error::CatalogError;

/// Catalog endpoint used when none is configured.
pub const DEFAULT_CATALOG_URL: &str =
    "https://api-preprod.djoli.africa/api/v1/rest/mobile/catalog/products-standards";

/// Fetches the catalog from the remote product service.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let unavailable = |e: reqwest::Error| CatalogError::Unavailable(e.to_string());

        debug!("Sending request");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body = response.bytes().await.map_err(unavailable)?;

        parse_catalog(&body)
    }
}

// Wire shape: `{ "data": { "data": [ ...products ] } }`.
#[derive(Deserialize)]
struct CatalogEnvelope {
    data: CatalogPage,
}

#[derive(Deserialize)]
struct CatalogPage {
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct RawProduct {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    unit: Option<RawUnit>,
}

#[derive(Deserialize)]
struct RawUnit {
    #[serde(default)]
    translation: Option<RawTranslation>,
}

#[derive(Deserialize)]
struct RawTranslation {
    #[serde(default)]
    title: Option<String>,
}

impl RawProduct {
    fn into_product(self) -> Option<Product> {
        let price = self.price.unwrap_or(Decimal::ZERO);
        if price.is_sign_negative() {
            warn!(product_id = self.id, %price, "Skipping catalog entry with a negative price");
            return None;
        }
        let unit_label = self
            .unit
            .and_then(|unit| unit.translation)
            .and_then(|translation| translation.title)
            .unwrap_or_default();
        Some(Product {
            id: ProductId(self.id),
            name: self.name.unwrap_or_default(),
            image_url: self.img.unwrap_or_default(),
            unit_price: price,
            unit_label,
        })
    }
}

/// Normalizes a catalog response body into products.
///
/// Missing name, image, price and unit default to empty or zero. Entries
/// without a usable id, or with a negative price, are skipped.
///
/// # Errors
/// A body that is not the expected envelope yields `Unavailable`.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<Product>, CatalogError> {
    let envelope: CatalogEnvelope = serde_json::from_slice(body)
        .map_err(|e| CatalogError::Unavailable(format!("malformed catalog response: {e}")))?;

    let products = envelope
        .data
        .data
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<RawProduct>(entry) {
            Ok(raw) => raw.into_product(),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable catalog entry");
                None
            }
        })
        .collect();
    Ok(products)
}

/// A catalog held in memory. Used for offline runs and in tests.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Result<Vec<Product>, CatalogError>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Ok(products),
        }
    }

    /// A catalog whose every fetch fails with `reason`.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            products: Err(CatalogError::Unavailable(reason.into())),
        }
    }

    pub fn demo() -> Self {
        Self::new(vec![
            Product::new(1, "Riz parfumé", Decimal::from(500), "kg"),
            Product::new(2, "Huile de palme", Decimal::from(1200), "L"),
            Product::new(3, "Oignons", Decimal::from(300), "kg"),
            Product::new(4, "Sucre", Decimal::from(700), "kg"),
        ])
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.products.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_normalizes_entries() {
        let body = br#"{
            "data": { "data": [
                {
                    "id": 12,
                    "name": "Riz",
                    "img": "https://cdn.example/riz.png",
                    "price": 500,
                    "unit": { "translation": { "title": "kg" } }
                },
                { "id": 13, "name": "Mil", "price": "350.50", "unit": null },
                { "id": 14 }
            ] }
        }"#;

        let products = parse_catalog(body).unwrap();

        assert_eq!(products.len(), 3);
        assert_eq!(
            products[0],
            Product::new(12, "Riz", Decimal::from(500), "kg").with_image("https://cdn.example/riz.png")
        );
        assert_eq!(products[1].unit_price, Decimal::new(35050, 2));
        assert_eq!(products[1].unit_label, "");
        assert_eq!(products[2].name, "");
        assert_eq!(products[2].unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_parse_catalog_skips_bad_entries() {
        let body = br#"{ "data": { "data": [
            { "name": "No id", "price": 10 },
            { "id": "abc", "name": "Bad id" },
            { "id": 3, "name": "Negative", "price": -5 },
            { "id": 4, "name": "Kept", "price": 10.25 }
        ] } }"#;

        let products = parse_catalog(body).unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, ProductId(4));
        assert_eq!(products[0].unit_price, Decimal::new(1025, 2));
    }

    #[test]
    fn test_malformed_envelope_is_unavailable() {
        for body in [&b"not json"[..], br#"{ "data": [] }"#, br#"{ "items": [] }"#] {
            assert!(matches!(parse_catalog(body), Err(CatalogError::Unavailable(_))));
        }
        assert_eq!(parse_catalog(br#"{ "data": { "data": [] } }"#), Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_static_catalog() {
        assert_eq!(StaticCatalog::demo().fetch_products().await.unwrap().len(), 4);
        assert_eq!(
            StaticCatalog::unreachable("connection refused").fetch_products().await,
            Err(CatalogError::Unavailable("connection refused".to_string()))
        );
    }
}
