use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::normalizer::CurrentPrice;

/// Cross-store view for one product: every current price, the cheapest one,
/// and each store's premium over it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    pub product_id: i32,
    pub prices: Vec<CurrentPrice>,
    pub lowest: CurrentPrice,
    /// store id -> non-negative difference versus the lowest price; the
    /// cheapest store maps to zero.
    pub differences: BTreeMap<i32, Decimal>,
}

/// `prices` must already be in Normalizer order (price asc, store id asc).
/// Returns None when the product has no current prices at all.
pub fn compare(product_id: i32, prices: Vec<CurrentPrice>) -> Option<PriceComparison> {
    let lowest = prices.first()?.clone();

    let differences: BTreeMap<i32, Decimal> = prices
        .iter()
        .map(|p| (p.store_id, p.price - lowest.price))
        .collect();

    Some(PriceComparison {
        product_id,
        prices,
        lowest,
        differences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{ DateTime, Utc };

    fn price(store_id: i32, cents: i64) -> CurrentPrice {
        CurrentPrice {
            observation_id: store_id as i64,
            product_id: 1,
            store_id,
            price: Decimal::new(cents, 2),
            currency: "USD".to_string(),
            is_sale: false,
            sale_end: None,
            observed_at: DateTime::parse_from_rfc3339("2025-06-15T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_lowest_store_maps_to_zero() {
        let comparison = compare(1, vec![price(10, 450), price(20, 500), price(30, 525)]).unwrap();

        assert_eq!(comparison.lowest.store_id, 10);
        assert_eq!(comparison.differences[&10], Decimal::ZERO);
        assert_eq!(comparison.differences[&20], Decimal::new(50, 2));
        assert_eq!(comparison.differences[&30], Decimal::new(75, 2));
    }

    #[test]
    fn test_differences_are_never_negative() {
        let comparison = compare(1, vec![price(10, 450), price(20, 620)]).unwrap();
        assert!(comparison.differences.values().all(|d| *d >= Decimal::ZERO));
    }

    #[test]
    fn test_no_prices_yields_none() {
        assert!(compare(1, vec![]).is_none());
    }
}
