use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::normalizer::CurrentPrice;

/// A target price that current prices have reached. Exists only while the
/// lowest current price stays at or below the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMatch {
    pub product_id: i32,
    pub target_price: Decimal,
    pub current: CurrentPrice,
    pub savings: Decimal,
}

/// Matches each (product, target) pair against the product's lowest current
/// price. Pairs with no current price are skipped: absence of data is not
/// absence of a target. Output is ordered by product id.
pub fn evaluate(
    targets: &[(i32, Decimal)],
    lowest_prices: &HashMap<i32, CurrentPrice>
) -> Vec<AlertMatch> {
    let mut matches: Vec<AlertMatch> = targets
        .iter()
        .filter_map(|(product_id, target)| {
            let current = lowest_prices.get(product_id)?;
            if current.price > *target {
                return None;
            }

            Some(AlertMatch {
                product_id: *product_id,
                target_price: *target,
                current: current.clone(),
                savings: *target - current.price,
            })
        })
        .collect();

    matches.sort_by_key(|m| m.product_id);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{ DateTime, Utc };

    fn price(product_id: i32, cents: i64) -> CurrentPrice {
        CurrentPrice {
            observation_id: product_id as i64,
            product_id,
            store_id: 10,
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
    fn test_price_at_or_below_target_matches() {
        let lowest = HashMap::from([(1, price(1, 450)), (2, price(2, 500))]);
        let targets = vec![(1, Decimal::new(500, 2)), (2, Decimal::new(500, 2))];

        let matches = evaluate(&targets, &lowest);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].savings, Decimal::new(50, 2));
        assert_eq!(matches[1].savings, Decimal::ZERO);
    }

    #[test]
    fn test_price_above_target_does_not_match() {
        let lowest = HashMap::from([(1, price(1, 600))]);
        let targets = vec![(1, Decimal::new(500, 2))];

        assert!(evaluate(&targets, &lowest).is_empty());
    }

    #[test]
    fn test_target_without_current_price_is_skipped() {
        let lowest = HashMap::from([(1, price(1, 450))]);
        let targets = vec![(1, Decimal::new(500, 2)), (99, Decimal::new(500, 2))];

        let matches = evaluate(&targets, &lowest);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].product_id, 1);
    }
}
