use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::config::{ComposerConfig, ConfigError};
use crate::actor_framework::ResourceActor;
use crate::actors::ComposerService;
use crate::clients::{
    CatalogSource, ComposerClient, HttpCatalogClient, HttpOrderClient, Navigator,
    OrderPersistence, OrderStoreClient, StaticCatalog,
};
use crate::composer::ComposeMode;
use crate::domain::{OrderId, OrderListSummary, OrderRecord};
use crate::error::{CatalogError, PersistenceError};

/// Startup and shutdown failures.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Actor task failed: {0}")]
    ActorFailed(String),
}

/// The main application system.
///
/// Wires the catalog source, the order persistence backend and the
/// navigator together, and starts one composer actor per session.
pub struct OrderSystem {
    orders: Arc<dyn OrderPersistence>,
    catalog: Arc<dyn CatalogSource>,
    navigator: Arc<dyn Navigator>,
    channel_buffer: usize,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Builds the system from configuration. Without an order API URL orders
    /// are kept by an in-process resource actor; without a catalog URL the
    /// demo catalog is served.
    pub fn new(config: &ComposerConfig, navigator: Arc<dyn Navigator>) -> Result<Self, SystemError> {
        let catalog: Arc<dyn CatalogSource> = match &config.catalog_url {
            Some(url) => {
                info!(%url, "Using remote catalog");
                Arc::new(HttpCatalogClient::new(url.as_str(), config.http_timeout)?)
            }
            None => {
                info!("Using demo catalog");
                Arc::new(StaticCatalog::demo())
            }
        };

        match &config.order_api_url {
            Some(url) => {
                info!(%url, "Using remote order service");
                let orders = Arc::new(HttpOrderClient::new(url.as_str(), config.http_timeout)?);
                Ok(Self::with_collaborators(catalog, orders, navigator, config.channel_buffer))
            }
            None => Ok(Self::in_memory(catalog, navigator, config.channel_buffer)),
        }
    }

    /// A system whose orders live in an in-process `ResourceActor`.
    pub fn in_memory(
        catalog: Arc<dyn CatalogSource>,
        navigator: Arc<dyn Navigator>,
        channel_buffer: usize,
    ) -> Self {
        let order_id_counter = Arc::new(AtomicU64::new(1));
        let next_order_id = move || OrderId(order_id_counter.fetch_add(1, Ordering::SeqCst));

        let (order_actor, order_resource_client) =
            ResourceActor::<OrderRecord>::new(channel_buffer, next_order_id);
        let order_handle = tokio::spawn(order_actor.run());
        info!("In-memory order store started");

        let orders = Arc::new(OrderStoreClient::new(order_resource_client));
        let mut system = Self::with_collaborators(catalog, orders, navigator, channel_buffer);
        system.handles.push(order_handle);
        system
    }

    pub fn with_collaborators(
        catalog: Arc<dyn CatalogSource>,
        orders: Arc<dyn OrderPersistence>,
        navigator: Arc<dyn Navigator>,
        channel_buffer: usize,
    ) -> Self {
        Self {
            orders,
            catalog,
            navigator,
            channel_buffer,
            handles: Vec::new(),
        }
    }

    pub fn orders(&self) -> &Arc<dyn OrderPersistence> {
        &self.orders
    }

    /// Starts a composer session and returns its handle. Loading begins
    /// immediately.
    pub fn open_session(&mut self, mode: ComposeMode) -> ComposerClient {
        let (service, client) = ComposerService::new(
            self.channel_buffer,
            mode,
            Arc::clone(&self.catalog),
            Arc::clone(&self.orders),
            Arc::clone(&self.navigator),
        );
        self.handles.push(tokio::spawn(service.run()));
        info!(%mode, "Composer session opened");
        client
    }

    pub fn open_create_session(&mut self) -> ComposerClient {
        self.open_session(ComposeMode::Create)
    }

    pub fn open_edit_session(&mut self, id: OrderId) -> ComposerClient {
        self.open_session(ComposeMode::Edit(id))
    }

    /// Figures shown above the order list.
    pub async fn order_summary(&self) -> Result<OrderListSummary, PersistenceError> {
        let records = self.orders.list().await?;
        Ok(OrderListSummary::from_records(&records))
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<(), PersistenceError> {
        self.orders.delete(id).await
    }

    /// Waits for every actor to stop.
    ///
    /// Sessions stop when shut down, cancelled or when their last handle is
    /// dropped; release them before calling this.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        // Dropping our collaborator handles closes the in-memory store's
        // channel once the sessions holding it have stopped.
        drop(self.orders);
        drop(self.catalog);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
