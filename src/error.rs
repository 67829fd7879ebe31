use rust_decimal::Decimal;
use thiserror::Error;

use crate::composer::SessionState;
use crate::domain::{LineItemKey, OrderId, ProductId};

/// The product catalog could not be fetched or understood.
///
/// Non-fatal: the session continues with an empty catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by an order persistence backend.
///
/// `Rejected` and `Transport` display the backend's message verbatim so it
/// can be shown to the operator as is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Order {0} not found")]
    NotFound(OrderId),
    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Unexpected response from order service: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Line item store operations that could not be applied. The store is left
/// unchanged in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No line item with key {0}")]
    UnknownKey(LineItemKey),
    #[error("Product {0} is not in the catalog")]
    UnknownProduct(ProductId),
    #[error("An order keeps at least one line item")]
    LastLineItem,
}

/// Operator input rejected before it reaches the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must be a number, got {raw:?}")]
    NotANumber { field: &'static str, raw: String },
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
    #[error("{field} cannot exceed {max}")]
    TooLarge { field: &'static str, max: Decimal },
}

/// A reason an order cannot be submitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Phone number {0:?} must be exactly 10 digits")]
    InvalidPhoneFormat(String),
    #[error("Add at least one product")]
    EmptyOrder,
    #[error("Line item {key} is incomplete: {reason}")]
    IncompleteLineItem {
        key: LineItemKey,
        reason: &'static str,
    },
}

/// Errors returned by a composer session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposerError {
    #[error("Operation not allowed while the session is {state}")]
    InvalidState { state: SessionState },
    #[error("A submission is already in flight")]
    SubmissionInFlight,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Order is invalid: {}", describe(.0))]
    Validation(Vec<ValidationError>),
    #[error("{0}")]
    SubmissionFailed(String),
    #[error("Order could not be loaded: {0}")]
    OrderLoadFailed(String),
    #[error("Composer session closed")]
    SessionClosed,
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_listed_together() {
        let err = ComposerError::Validation(vec![
            ValidationError::MissingField("customer_name"),
            ValidationError::EmptyOrder,
        ]);

        assert_eq!(
            err.to_string(),
            "Order is invalid: Missing required field: customer_name; Add at least one product"
        );
    }

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = PersistenceError::Rejected {
            status: Some(422),
            message: "The customer phone field is required.".to_string(),
        };
        assert_eq!(err.to_string(), "The customer phone field is required.");
    }
}
