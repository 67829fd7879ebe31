use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::Order;
use crate::error::ValidationError;

const PHONE_DIGITS: usize = 10;

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Checks an order before submission.
///
/// All checks run; every violation is returned together. The order is
/// handed back untouched on success.
pub fn validate(order: Order) -> Result<Order, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if order.customer_name.trim().is_empty() {
        errors.push(ValidationError::MissingField("customer_name"));
    }

    if order.customer_phone.is_empty() {
        errors.push(ValidationError::MissingField("customer_phone"));
    } else if !is_valid_phone(&order.customer_phone) {
        errors.push(ValidationError::InvalidPhoneFormat(order.customer_phone.clone()));
    }

    if order.items.is_empty() {
        errors.push(ValidationError::EmptyOrder);
    }

    for item in &order.items {
        let reason = if item.product_id.is_none() {
            Some("no product selected")
        } else if item.quantity.is_none() {
            Some("quantity is required")
        } else if item.quantity == Some(0) {
            Some("quantity must be at least 1")
        } else if item.unit_price.is_none() {
            Some("unit price is required")
        } else if item.unit_price.is_some_and(|price| price < Decimal::ZERO) {
            Some("unit price cannot be negative")
        } else {
            None
        };
        if let Some(reason) = reason {
            errors.push(ValidationError::IncompleteLineItem {
                key: item.key,
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(order)
    } else {
        debug!(error_count = errors.len(), "Order failed validation");
        Err(errors)
    }
}
