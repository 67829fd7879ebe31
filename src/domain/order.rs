use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::{LineItem, ProductId};
use crate::error::ValidationError;

/// Identifier assigned to an order by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Reads a value sent either as a JSON number or as a numeric string, the
/// way stored amounts are accepted.
fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload<T> {
        Number(T),
        Text(String),
    }

    match Payload::<T>::deserialize(deserializer)? {
        Payload::Number(value) => Ok(value),
        Payload::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Represents the order aggregate being composed.
///
/// `total` is always the sum of the item subtotals; it is never edited
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub customer_name: String,
    pub customer_phone: String,
    pub total: Decimal,
    pub items: Vec<LineItem>,
}

/// Body sent to the order service on create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    pub items: Vec<OrderItemPayload>,
}

/// One line of an [`OrderPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit: String,
    pub quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
    pub product_img: String,
}

impl TryFrom<&Order> for OrderPayload {
    type Error = ValidationError;

    /// Builds the wire payload, re-deriving every subtotal and the total from
    /// quantity and unit price.
    ///
    /// # Errors
    /// Returns `IncompleteLineItem` for the first row that has no product,
    /// quantity or unit price.
    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        let items = order
            .items
            .iter()
            .map(|item| {
                let incomplete = |reason| ValidationError::IncompleteLineItem {
                    key: item.key,
                    reason,
                };
                let product_id = item.product_id.ok_or_else(|| incomplete("no product selected"))?;
                let quantity = item.quantity.ok_or_else(|| incomplete("quantity is required"))?;
                let unit_price = item.unit_price.ok_or_else(|| incomplete("unit price is required"))?;
                Ok(OrderItemPayload {
                    product_id,
                    product_name: item.product_name.clone(),
                    unit: item.unit.clone(),
                    quantity,
                    unit_price,
                    subtotal: unit_price.saturating_mul(Decimal::from(quantity)),
                    product_img: item.product_image.clone(),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let total = items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.subtotal));

        Ok(Self {
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            total,
            items,
        })
    }
}

/// An order as stored by the order service (`GET /orders/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(deserialize_with = "number_or_string")]
    pub id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderItemRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A stored order line. Missing text fields default to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    #[serde(deserialize_with = "number_or_string")]
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(deserialize_with = "number_or_string")]
    pub quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
    #[serde(default)]
    pub product_img: String,
    /// Older records carry the image under `img` instead of `product_img`.
    #[serde(default, skip_serializing)]
    pub img: Option<String>,
}

impl OrderItemRecord {
    pub fn image(&self) -> &str {
        match (&self.product_img, &self.img) {
            (primary, Some(legacy)) if primary.is_empty() => legacy,
            (primary, _) => primary,
        }
    }
}

impl From<OrderItemPayload> for OrderItemRecord {
    fn from(item: OrderItemPayload) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name,
            unit: item.unit,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            product_img: item.product_img,
            img: None,
        }
    }
}

/// Aggregate figures shown above the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderListSummary {
    pub order_count: usize,
    pub revenue: Decimal,
    pub article_count: usize,
}

impl OrderListSummary {
    pub fn from_records(records: &[OrderRecord]) -> Self {
        records.iter().fold(Self::default(), |summary, record| Self {
            order_count: summary.order_count + 1,
            revenue: summary.revenue.saturating_add(record.total),
            article_count: summary.article_count + record.items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineItemKey;

    fn line(key: u64, product: Option<u64>, quantity: u32, price: i64) -> LineItem {
        LineItem {
            key: LineItemKey::new(key),
            product_id: product.map(ProductId),
            product_name: "Rice".to_string(),
            product_image: "rice.png".to_string(),
            unit: "kg".to_string(),
            quantity: Some(quantity),
            unit_price: Some(Decimal::from(price)),
            subtotal: Decimal::ZERO,
        }
    }

    #[test]
    fn test_payload_rederives_subtotals_and_total() {
        let order = Order {
            customer_name: "Awa".to_string(),
            customer_phone: "0123456789".to_string(),
            total: Decimal::ZERO,
            items: vec![line(1, Some(1), 3, 500), line(2, Some(2), 2, 400)],
        };

        let payload = OrderPayload::try_from(&order).unwrap();

        assert_eq!(payload.items[0].subtotal, Decimal::from(1500));
        assert_eq!(payload.items[1].subtotal, Decimal::from(800));
        assert_eq!(payload.total, Decimal::from(2300));
    }

    #[test]
    fn test_payload_rejects_unselected_row() {
        let order = Order {
            customer_name: "Awa".to_string(),
            customer_phone: "0123456789".to_string(),
            total: Decimal::ZERO,
            items: vec![line(7, None, 1, 0)],
        };

        let err = OrderPayload::try_from(&order).unwrap_err();
        assert!(matches!(err, ValidationError::IncompleteLineItem { key, .. } if key.get() == 7));
    }

    #[test]
    fn test_payload_serializes_numbers_as_json_numbers() {
        let order = Order {
            customer_name: "Awa".to_string(),
            customer_phone: "0123456789".to_string(),
            total: Decimal::ZERO,
            items: vec![line(1, Some(1), 3, 500)],
        };
        let payload = OrderPayload::try_from(&order).unwrap();

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["total"], serde_json::json!(1500.0));
        assert_eq!(json["items"][0]["product_id"], serde_json::json!(1));
        assert_eq!(json["items"][0]["unit_price"], serde_json::json!(500.0));
        assert_eq!(json["items"][0]["product_img"], serde_json::json!("rice.png"));
    }

    #[test]
    fn test_record_accepts_string_amounts_and_legacy_image() {
        let record: OrderRecord = serde_json::from_str(
            r#"{
                "id": 12,
                "customer_name": "Awa",
                "customer_phone": "0123456789",
                "total": "1500.00",
                "items": [
                    {"product_id": 1, "quantity": 3, "unit_price": 500, "subtotal": "1500.00", "img": "rice.png"}
                ],
                "created_at": "2024-05-01T10:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, OrderId(12));
        assert_eq!(record.total, Decimal::from(1500));
        assert_eq!(record.items[0].image(), "rice.png");
        assert_eq!(record.items[0].product_name, "");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_record_accepts_string_ids_and_quantity() {
        let record: OrderRecord = serde_json::from_str(
            r#"{
                "id": "12",
                "customer_name": "Awa",
                "customer_phone": "0123456789",
                "total": 1500,
                "items": [
                    {"product_id": "1", "quantity": "3", "unit_price": "500"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, OrderId(12));
        assert_eq!(record.items[0].product_id, ProductId(1));
        assert_eq!(record.items[0].quantity, 3);
    }

    #[test]
    fn test_record_rejects_non_numeric_quantity() {
        let err = serde_json::from_str::<OrderItemRecord>(
            r#"{"product_id": 1, "quantity": "three", "unit_price": 500}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid digit"), "{err}");
    }

    #[test]
    fn test_list_summary() {
        let record = |id, total, items: usize| OrderRecord {
            id: OrderId(id),
            customer_name: "Awa".to_string(),
            customer_phone: "0123456789".to_string(),
            total: Decimal::from(total),
            items: (0..items)
                .map(|_| OrderItemRecord {
                    product_id: ProductId(1),
                    product_name: String::new(),
                    unit: String::new(),
                    quantity: 1,
                    unit_price: Decimal::ZERO,
                    subtotal: Decimal::ZERO,
                    product_img: String::new(),
                    img: None,
                })
                .collect(),
            created_at: None,
        };

        let summary = OrderListSummary::from_records(&[record(1, 1500, 1), record(2, 800, 2)]);

        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.revenue, Decimal::from(2300));
        assert_eq!(summary.article_count, 3);
    }
}
