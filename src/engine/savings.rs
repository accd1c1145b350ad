use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::deals::Deal;

/// Realized savings over a window: total plus per-category breakdown.
/// Categories with no qualifying deals never appear in the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsBreakdown {
    pub total_savings: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
}

/// Sums baseline-minus-current per deal, bucketed by product category.
/// Callers pass one deal per product (its best one), so a product cannot
/// multiply its savings across stores. Uncategorized products count toward
/// the total only.
pub fn aggregate(deals: &[(Deal, Option<String>)]) -> SavingsBreakdown {
    let mut total = Decimal::ZERO;
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();

    for (deal, category) in deals {
        let saved = deal.baseline_price - deal.current_price;
        if saved <= Decimal::ZERO {
            continue;
        }

        total += saved;
        if let Some(category) = category {
            *by_category.entry(category.clone()).or_insert(Decimal::ZERO) += saved;
        }
    }

    SavingsBreakdown {
        total_savings: total.round_dp(2),
        by_category: by_category
            .into_iter()
            .map(|(category, saved)| (category, saved.round_dp(2)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(product_id: i32, baseline_cents: i64, current_cents: i64) -> Deal {
        Deal {
            product_id,
            store_id: 10,
            current_price: Decimal::new(current_cents, 2),
            baseline_price: Decimal::new(baseline_cents, 2),
            discount_percent: Decimal::new(100, 1),
            is_sale: false,
        }
    }

    #[test]
    fn test_savings_sum_by_category() {
        let deals = vec![
            (deal(1, 1000, 800), Some("Dairy".to_string())),
            (deal(2, 500, 400), Some("Dairy".to_string())),
            (deal(3, 2000, 1500), Some("Produce".to_string()))
        ];

        let breakdown = aggregate(&deals);

        assert_eq!(breakdown.total_savings, Decimal::new(800, 2));
        assert_eq!(breakdown.by_category["Dairy"], Decimal::new(300, 2));
        assert_eq!(breakdown.by_category["Produce"], Decimal::new(500, 2));
    }

    #[test]
    fn test_categories_without_deals_are_omitted() {
        let deals = vec![(deal(1, 1000, 800), Some("Dairy".to_string()))];

        let breakdown = aggregate(&deals);
        assert!(!breakdown.by_category.contains_key("Produce"));
        assert_eq!(breakdown.by_category.len(), 1);
    }

    #[test]
    fn test_uncategorized_counts_toward_total_only() {
        let deals = vec![(deal(1, 1000, 750), None)];

        let breakdown = aggregate(&deals);
        assert_eq!(breakdown.total_savings, Decimal::new(250, 2));
        assert!(breakdown.by_category.is_empty());
    }

    #[test]
    fn test_empty_window_has_no_breakdown_entries() {
        let breakdown = aggregate(&[]);
        assert_eq!(breakdown.total_savings, Decimal::ZERO);
        assert!(breakdown.by_category.is_empty());
    }
}
