//! Subtotal and total derivation.
//!
//! Pure functions, run synchronously after every line item mutation: the
//! item first, then the total.

use rust_decimal::Decimal;

use crate::domain::LineItem;

/// `quantity × unit_price`, with a missing quantity counted as 1 and a
/// missing price as 0 so a row that is mid-edit still has a defined value.
pub fn line_subtotal(quantity: Option<u32>, unit_price: Option<Decimal>) -> Decimal {
    let quantity = Decimal::from(quantity.unwrap_or(1));
    unit_price.unwrap_or(Decimal::ZERO).saturating_mul(quantity)
}

/// Returns a copy of `item` with its subtotal re-derived.
pub fn recompute_item(item: &LineItem) -> LineItem {
    LineItem {
        subtotal: line_subtotal(item.quantity, item.unit_price),
        ..item.clone()
    }
}

/// In-place form of [`recompute_item`] used by the store.
pub(crate) fn refresh_item(item: &mut LineItem) {
    item.subtotal = line_subtotal(item.quantity, item.unit_price);
}

/// Sum of all subtotals, unselected rows included.
pub fn recompute_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |total, item| total.saturating_add(item.subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineItemKey;

    fn item(quantity: Option<u32>, unit_price: Option<i64>) -> LineItem {
        LineItem {
            key: LineItemKey::new(1),
            product_id: None,
            product_name: String::new(),
            product_image: String::new(),
            unit: String::new(),
            quantity,
            unit_price: unit_price.map(Decimal::from),
            subtotal: Decimal::from(999),
        }
    }

    #[test]
    fn test_subtotal_is_quantity_times_price() {
        for (quantity, price) in [(1u32, 0i64), (3, 500), (7, 125), (1000, 1)] {
            let derived = recompute_item(&item(Some(quantity), Some(price)));
            assert_eq!(derived.subtotal, Decimal::from(price) * Decimal::from(quantity));
        }
    }

    #[test]
    fn test_fractional_prices_are_exact() {
        let mut row = item(Some(3), None);
        row.unit_price = Some(Decimal::new(1999, 2));

        assert_eq!(recompute_item(&row).subtotal, Decimal::new(5997, 2));
    }

    #[test]
    fn test_missing_inputs_use_neutral_defaults() {
        assert_eq!(recompute_item(&item(None, Some(250))).subtotal, Decimal::from(250));
        assert_eq!(recompute_item(&item(Some(4), None)).subtotal, Decimal::ZERO);
        assert_eq!(recompute_item(&item(None, None)).subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let once = recompute_item(&item(Some(3), Some(500)));
        let twice = recompute_item(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_total_sums_subtotals() {
        let items = vec![
            recompute_item(&item(Some(3), Some(500))),
            recompute_item(&item(Some(2), Some(400))),
            recompute_item(&item(Some(1), None)),
        ];
        assert_eq!(recompute_total(&items), Decimal::from(2300));
        assert_eq!(recompute_total(&[]), Decimal::ZERO);
    }
}
