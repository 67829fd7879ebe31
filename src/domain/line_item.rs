use std::fmt;

use rust_decimal::Decimal;

use super::ProductId;

/// Stable identity of a line item within one store.
///
/// Keys are minted by the store when a row is created and are never reused,
/// so removing a row does not renumber the rows that survive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineItemKey(u64);

impl LineItemKey {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row_{}", self.0)
    }
}

/// One product entry within an order being composed.
///
/// `quantity` and `unit_price` are `None` while the operator has cleared the
/// field mid-edit. `subtotal` is always derived, never set by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub key: LineItemKey,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_image: String,
    pub unit: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub subtotal: Decimal,
}

impl LineItem {
    /// True once a product is selected and both numeric inputs are present.
    pub fn is_complete(&self) -> bool {
        self.product_id.is_some() && self.quantity.is_some() && self.unit_price.is_some()
    }
}

/// Initial values for a freshly appended line item.
///
/// There is no product id here: a new row always starts unselected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemDraft {
    pub product_name: String,
    pub product_image: String,
    pub unit: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

impl LineItemDraft {
    pub fn with_quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }
}
