//! Parsing of raw operator input into store values.
//!
//! Blank input means the field was cleared mid-edit and maps to `None`;
//! anything else must be a valid, non-negative number or it is rejected
//! here so the store only ever sees well-formed values.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::InputError;

/// Largest unit price accepted from the operator.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Drops the grouping spaces used when displaying amounts (`1 500`).
fn strip_grouping(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect()
}

pub fn parse_quantity(raw: &str) -> Result<Option<u32>, InputError> {
    let cleaned = strip_grouping(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }
    if cleaned.starts_with('-') {
        return Err(InputError::Negative { field: "quantity" });
    }
    match cleaned.parse::<u32>() {
        Ok(0) => Err(InputError::ZeroQuantity),
        Ok(quantity) => Ok(Some(quantity)),
        Err(_) => Err(InputError::NotANumber {
            field: "quantity",
            raw: raw.to_string(),
        }),
    }
}

pub fn parse_unit_price(raw: &str) -> Result<Option<Decimal>, InputError> {
    let cleaned = strip_grouping(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }
    let price = Decimal::from_str(&cleaned).map_err(|_| InputError::NotANumber {
        field: "unit price",
        raw: raw.to_string(),
    })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(InputError::Negative { field: "unit price" });
    }
    if price > MAX_UNIT_PRICE {
        return Err(InputError::TooLarge {
            field: "unit price",
            max: MAX_UNIT_PRICE,
        });
    }
    Ok(Some(price.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_unit_price_is_one_trillion() {
        assert_eq!(MAX_UNIT_PRICE, Decimal::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_quantity() {
        assert_eq!(parse_quantity("3"), Ok(Some(3)));
        assert_eq!(parse_quantity(" 1 200 "), Ok(Some(1200)));
        assert_eq!(parse_quantity(""), Ok(None));
        assert_eq!(parse_quantity("0"), Err(InputError::ZeroQuantity));
        assert_eq!(parse_quantity("-2"), Err(InputError::Negative { field: "quantity" }));
        assert!(matches!(parse_quantity("1.5"), Err(InputError::NotANumber { .. })));
        assert!(matches!(parse_quantity("abc"), Err(InputError::NotANumber { .. })));
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(parse_unit_price("500"), Ok(Some(Decimal::from(500))));
        assert_eq!(parse_unit_price("1 500"), Ok(Some(Decimal::from(1500))));
        assert_eq!(parse_unit_price("19.99"), Ok(Some(Decimal::new(1999, 2))));
        assert_eq!(parse_unit_price("0"), Ok(Some(Decimal::ZERO)));
        assert_eq!(parse_unit_price("-0"), Ok(Some(Decimal::ZERO)));
        assert_eq!(parse_unit_price("  "), Ok(None));
        assert_eq!(parse_unit_price("-1"), Err(InputError::Negative { field: "unit price" }));
        assert!(matches!(parse_unit_price("12abc"), Err(InputError::NotANumber { .. })));
        assert!(matches!(parse_unit_price("1000000000001"), Err(InputError::TooLarge { .. })));
    }
}
