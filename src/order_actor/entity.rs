use chrono::Utc;
use rust_decimal::Decimal;

use crate::actor_framework::Entity;
use crate::domain::{OrderId, OrderItemRecord, OrderPayload, OrderRecord};

/// Rejects payloads whose total does not match their lines, the same
/// consistency the composer maintains on its side.
fn check_totals(payload: &OrderPayload) -> Result<(), String> {
    let sum = payload
        .items
        .iter()
        .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.subtotal));
    if sum != payload.total {
        return Err(format!(
            "Order total {} does not match the sum of its lines {}",
            payload.total, sum
        ));
    }
    if payload.items.is_empty() {
        return Err("An order needs at least one product".to_string());
    }
    Ok(())
}

impl Entity for OrderRecord {
    type Id = OrderId;
    type CreatePayload = OrderPayload;
    type Patch = OrderPayload;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a stored order from a submitted payload.
    ///
    /// # Notes
    /// `created_at` is stamped here; updates leave it untouched.
    fn from_create(id: OrderId, payload: OrderPayload) -> Result<Self, String> {
        check_totals(&payload)?;
        Ok(Self {
            id,
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            total: payload.total,
            items: payload.items.into_iter().map(OrderItemRecord::from).collect(),
            created_at: Some(Utc::now()),
        })
    }

    /// Replaces customer fields and lines with the payload's.
    fn on_update(&mut self, payload: OrderPayload) -> Result<(), String> {
        check_totals(&payload)?;
        self.customer_name = payload.customer_name;
        self.customer_phone = payload.customer_phone;
        self.total = payload.total;
        self.items = payload.items.into_iter().map(OrderItemRecord::from).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItemPayload, ProductId};

    fn payload(total: i64) -> OrderPayload {
        OrderPayload {
            customer_name: "Awa".to_string(),
            customer_phone: "0123456789".to_string(),
            total: Decimal::from(total),
            items: vec![OrderItemPayload {
                product_id: ProductId(1),
                product_name: "Rice".to_string(),
                unit: "kg".to_string(),
                quantity: 3,
                unit_price: Decimal::from(500),
                subtotal: Decimal::from(1500),
                product_img: String::new(),
            }],
        }
    }

    #[test]
    fn test_create_and_update() {
        let mut record = OrderRecord::from_create(OrderId(1), payload(1500)).unwrap();
        assert_eq!(record.items.len(), 1);
        assert!(record.created_at.is_some());
        let created_at = record.created_at;

        let mut edited = payload(1500);
        edited.customer_name = "Awa Koné".to_string();
        record.on_update(edited).unwrap();

        assert_eq!(record.customer_name, "Awa Koné");
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn test_inconsistent_total_is_rejected() {
        let err = OrderRecord::from_create(OrderId(1), payload(1000)).unwrap_err();
        assert!(err.contains("does not match"));
    }
}
