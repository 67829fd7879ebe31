use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::OrderPersistence;
use crate::domain::{OrderId, OrderPayload, OrderRecord};
use crate::error::PersistenceError;

/// Order service base URL used when none is configured.
pub const DEFAULT_ORDER_API_URL: &str = "http://localhost:8000/api";

/// Client for the remote order service.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PersistenceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Passes successful responses through and turns everything else into
    /// `Rejected` carrying the service's own message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PersistenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = rejection_message(status, &text);
        warn!(status = status.as_u16(), %message, "Order service rejected the request");
        Err(PersistenceError::Rejected {
            status: Some(status.as_u16()),
            message,
        })
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Message to show for a non-success response: the body's `message` field
/// when present, otherwise a generic line naming the status code.
pub fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

/// Id of a newly created order, read from `id` or `data.id`.
pub fn created_order_id(body: &Value) -> Option<OrderId> {
    body.get("id")
        .or_else(|| body.get("data").and_then(|data| data.get("id")))
        .and_then(Value::as_u64)
        .map(OrderId)
}

#[async_trait]
impl OrderPersistence for HttpOrderClient {
    #[instrument(skip(self))]
    async fn fetch(&self, id: OrderId) -> Result<OrderRecord, PersistenceError> {
        debug!("Sending request");
        let response = self
            .client
            .get(self.url(&format!("orders/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<OrderRecord>, PersistenceError> {
        debug!("Sending request");
        let response = self.client.get(self.url("orders")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self, payload), fields(customer = %payload.customer_name, total = %payload.total))]
    async fn create(&self, payload: OrderPayload) -> Result<Option<OrderId>, PersistenceError> {
        debug!("Sending request");
        let response = self
            .client
            .post(self.url("orders"))
            .json(&payload)
            .send()
            .await?;
        let text = Self::check(response).await?.text().await?;
        // An empty or non-JSON body still counts as created.
        let id = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(created_order_id);
        info!(order_id = ?id, "Order created");
        Ok(id)
    }

    #[instrument(skip(self, payload), fields(total = %payload.total))]
    async fn update(&self, id: OrderId, payload: OrderPayload) -> Result<(), PersistenceError> {
        debug!("Sending request");
        let response = self
            .client
            .put(self.url(&format!("orders/{id}")))
            .json(&payload)
            .send()
            .await?;
        Self::check(response).await?;
        info!("Order updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<(), PersistenceError> {
        debug!("Sending request");
        let response = self
            .client
            .delete(self.url(&format!("orders/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PersistenceError::NotFound(id));
        }
        Self::check(response).await?;
        info!("Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://localhost:8000/api", "orders"), "http://localhost:8000/api/orders");
        assert_eq!(join_url("http://localhost:8000/api/", "/orders/4"), "http://localhost:8000/api/orders/4");
    }

    #[test]
    fn test_rejection_message_prefers_body_message() {
        let body = r#"{"message": "The customer phone field must be 10 digits.", "errors": {}}"#;
        assert_eq!(
            rejection_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "The customer phone field must be 10 digits."
        );
    }

    #[test]
    fn test_rejection_message_falls_back_to_status() {
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Request failed with status code 500"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, r#"{"message": ""}"#),
            "Request failed with status code 400"
        );
    }

    #[test]
    fn test_created_order_id() {
        assert_eq!(created_order_id(&json!({"id": 31})), Some(OrderId(31)));
        assert_eq!(created_order_id(&json!({"data": {"id": 8}})), Some(OrderId(8)));
        assert_eq!(created_order_id(&json!({"status": "ok"})), None);
    }
}
