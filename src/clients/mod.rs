//! Collaborators consumed by the composer (catalog source, order
//! persistence, navigation) and the handle used to drive a session.

#[macro_use]
mod macros;

pub mod catalog_client;
pub mod composer_client;
pub mod http_order_client;
pub mod navigator;
pub mod order_client;

use async_trait::async_trait;

use crate::domain::{OrderId, OrderPayload, OrderRecord, Product};
use crate::error::{CatalogError, PersistenceError};

pub use catalog_client::{HttpCatalogClient, StaticCatalog};
pub use composer_client::ComposerClient;
pub use http_order_client::HttpOrderClient;
pub use navigator::{Navigator, RecordingNavigator, Route};
pub use order_client::OrderStoreClient;

/// Source of the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}

/// The order service: `GET`, `POST`, `PUT` and `DELETE` on `/orders`.
#[async_trait]
pub trait OrderPersistence: Send + Sync {
    async fn fetch(&self, id: OrderId) -> Result<OrderRecord, PersistenceError>;

    async fn list(&self) -> Result<Vec<OrderRecord>, PersistenceError>;

    /// Returns the new order's id when the service reports one.
    async fn create(&self, payload: OrderPayload) -> Result<Option<OrderId>, PersistenceError>;

    async fn update(&self, id: OrderId, payload: OrderPayload) -> Result<(), PersistenceError>;

    async fn delete(&self, id: OrderId) -> Result<(), PersistenceError>;
}
