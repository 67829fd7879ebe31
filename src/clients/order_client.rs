use async_trait::async_trait;
use tracing::{info, instrument};

use super::OrderPersistence;
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{OrderId, OrderPayload, OrderRecord};
use crate::error::PersistenceError;

/// Order persistence backed by an in-process `ResourceActor<OrderRecord>`.
#[derive(Clone)]
pub struct OrderStoreClient {
    inner: ResourceClient<OrderRecord>,
}

impl OrderStoreClient {
    pub fn new(inner: ResourceClient<OrderRecord>) -> Self {
        Self { inner }
    }
}

fn map_framework_error(id: Option<OrderId>, err: FrameworkError) -> PersistenceError {
    match (err, id) {
        (FrameworkError::NotFound(_), Some(id)) => PersistenceError::NotFound(id),
        (FrameworkError::Rejected(message), _) => PersistenceError::Rejected {
            status: None,
            message,
        },
        (other, _) => PersistenceError::Transport(other.to_string()),
    }
}

impl_client_methods!(OrderStoreClient, OrderRecord, OrderId, PersistenceError, order, map_framework_error);

#[async_trait]
impl OrderPersistence for OrderStoreClient {
    async fn fetch(&self, id: OrderId) -> Result<OrderRecord, PersistenceError> {
        self.get_order(id)
            .await?
            .ok_or(PersistenceError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<OrderRecord>, PersistenceError> {
        self.inner
            .list()
            .await
            .map_err(|e| map_framework_error(None, e))
    }

    #[instrument(skip(self, payload), fields(customer = %payload.customer_name))]
    async fn create(&self, payload: OrderPayload) -> Result<Option<OrderId>, PersistenceError> {
        let id = self
            .inner
            .create(payload)
            .await
            .map_err(|e| map_framework_error(None, e))?;
        info!(order_id = %id, "Order stored");
        Ok(Some(id))
    }

    #[instrument(skip(self, payload))]
    async fn update(&self, id: OrderId, payload: OrderPayload) -> Result<(), PersistenceError> {
        self.inner
            .update(id, payload)
            .await
            .map_err(|e| map_framework_error(Some(id), e))?;
        info!("Order replaced");
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<(), PersistenceError> {
        self.delete_order(id).await
    }
}
