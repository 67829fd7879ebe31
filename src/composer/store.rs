use rust_decimal::Decimal;
use tracing::debug;

use super::catalog::CatalogSnapshot;
use super::derivation::{recompute_total, refresh_item};
use crate::domain::{LineItem, LineItemDraft, LineItemKey, OrderItemRecord, ProductId};
use crate::error::StoreError;

/// Ordered collection of line items with position-independent keys.
///
/// Every mutation re-derives the touched item's subtotal and then the
/// total before returning, so reads never observe stale figures.
#[derive(Debug, Clone)]
pub struct LineItemStore {
    items: Vec<LineItem>,
    next_key: u64,
    total: Decimal,
}

impl Default for LineItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemStore {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_key: 1,
            total: Decimal::ZERO,
        }
    }

    /// A store holding one unselected row with quantity 1.
    pub fn with_blank_row() -> Self {
        let mut store = Self::new();
        store.append(LineItemDraft::default());
        store
    }

    /// Rebuilds a store from the lines of a stored order. Subtotals are
    /// re-derived rather than trusted. An order without lines still gets one
    /// blank row.
    pub fn hydrate(records: &[OrderItemRecord]) -> Self {
        let mut store = Self::new();
        for record in records {
            let key = store.mint_key();
            let mut item = LineItem {
                key,
                product_id: Some(record.product_id),
                product_name: record.product_name.clone(),
                product_image: record.image().to_string(),
                unit: record.unit.clone(),
                quantity: Some(record.quantity),
                unit_price: Some(record.unit_price),
                subtotal: Decimal::ZERO,
            };
            refresh_item(&mut item);
            store.items.push(item);
        }
        if store.items.is_empty() {
            store.append(LineItemDraft::default());
        }
        store.total = recompute_total(&store.items);
        store
    }

    fn mint_key(&mut self) -> LineItemKey {
        let key = LineItemKey::new(self.next_key);
        self.next_key += 1;
        key
    }

    fn position(&self, key: LineItemKey) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.key == key)
            .ok_or(StoreError::UnknownKey(key))
    }

    /// Re-derives the item at `index`, then the total.
    fn derive(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            refresh_item(item);
        }
        self.total = recompute_total(&self.items);
    }

    /// Appends a new unselected row and returns its freshly minted key.
    /// Quantity defaults to 1.
    pub fn append(&mut self, draft: LineItemDraft) -> LineItemKey {
        let key = self.mint_key();
        self.items.push(LineItem {
            key,
            product_id: None,
            product_name: draft.product_name,
            product_image: draft.product_image,
            unit: draft.unit,
            quantity: Some(draft.quantity.unwrap_or(1)),
            unit_price: draft.unit_price,
            subtotal: Decimal::ZERO,
        });
        self.derive(self.items.len() - 1);
        debug!(key = %key, rows = self.items.len(), "Line item appended");
        key
    }

    /// Removes the row with `key`. The last remaining row cannot be removed.
    pub fn remove(&mut self, key: LineItemKey) -> Result<LineItem, StoreError> {
        let index = self.position(key)?;
        if self.items.len() == 1 {
            return Err(StoreError::LastLineItem);
        }
        let removed = self.items.remove(index);
        self.total = recompute_total(&self.items);
        debug!(key = %key, rows = self.items.len(), "Line item removed");
        Ok(removed)
    }

    /// Copies the product's name, image, unit and price onto the row,
    /// keeping its quantity (1 if it was cleared).
    pub fn select_product(
        &mut self,
        key: LineItemKey,
        product_id: ProductId,
        catalog: &CatalogSnapshot,
    ) -> Result<&LineItem, StoreError> {
        let index = self.position(key)?;
        let product = catalog
            .find(product_id)
            .ok_or(StoreError::UnknownProduct(product_id))?;

        let item = &mut self.items[index];
        item.product_id = Some(product.id);
        item.product_name = product.name.clone();
        item.product_image = product.image_url.clone();
        item.unit = product.unit_label.clone();
        item.unit_price = Some(product.unit_price);
        item.quantity = Some(item.quantity.unwrap_or(1));

        self.derive(index);
        debug!(key = %key, product_id = %product_id, "Product selected");
        Ok(&self.items[index])
    }

    pub fn update_quantity(
        &mut self,
        key: LineItemKey,
        quantity: Option<u32>,
    ) -> Result<&LineItem, StoreError> {
        let index = self.position(key)?;
        self.items[index].quantity = quantity;
        self.derive(index);
        Ok(&self.items[index])
    }

    /// Overwrites the unit price. A manual price may differ from the
    /// catalog price and is kept as entered.
    pub fn update_unit_price(
        &mut self,
        key: LineItemKey,
        unit_price: Option<Decimal>,
    ) -> Result<&LineItem, StoreError> {
        let index = self.position(key)?;
        self.items[index].unit_price = unit_price;
        self.derive(index);
        Ok(&self.items[index])
    }

    /// Read-only view of the rows in display order.
    pub fn snapshot(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, key: LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
