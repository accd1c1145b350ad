use std::collections::BTreeMap;

use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::entity::price_observation;
use crate::engine::normalizer::{ self, CurrentPrice };

/// A price currently sitting below its rolling baseline. Recomputed on
/// every query; lives exactly as long as the underlying CurrentPrice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub product_id: i32,
    pub store_id: i32,
    pub current_price: Decimal,
    pub baseline_price: Decimal,
    pub discount_percent: Decimal,
    pub is_sale: bool,
}

/// Mean of the pair's other observations in the window. None when the pair
/// has nothing besides the current row; one observation is not a baseline.
pub fn baseline_price(
    observations: &[price_observation::Model],
    current: &CurrentPrice,
    now: DateTime<Utc>
) -> Option<Decimal> {
    let prior: Vec<Decimal> = observations
        .iter()
        .filter(|o| o.store_id == current.store_id)
        .filter(|o| o.id != current.observation_id)
        .filter(|o| o.observed_at <= now)
        .map(|o| o.price)
        .collect();

    if prior.is_empty() {
        return None;
    }

    let sum: Decimal = prior.iter().copied().sum();
    Some(sum / Decimal::from(prior.len() as u64))
}

/// Discount of `current` versus `baseline`, as a percentage rounded to one
/// decimal. Negative when the price rose.
pub fn discount_percent(baseline: Decimal, current: Decimal) -> Decimal {
    if baseline.is_zero() {
        return Decimal::ZERO;
    }

    (((baseline - current) / baseline) * Decimal::from(100u32)).round_dp(1)
}

pub fn detect_deal(
    observations: &[price_observation::Model],
    current: &CurrentPrice,
    now: DateTime<Utc>,
    min_discount_percent: Decimal
) -> Option<Deal> {
    let baseline = baseline_price(observations, current, now)?;
    let discount = discount_percent(baseline, current.price);

    if discount < min_discount_percent {
        return None;
    }

    Some(Deal {
        product_id: current.product_id,
        store_id: current.store_id,
        current_price: current.price,
        baseline_price: baseline.round_dp(2),
        discount_percent: discount,
        is_sale: current.is_sale,
    })
}

/// One candidate deal per (product, store) pair in a mixed observation
/// scan: the pair's current price checked against its own baseline.
pub fn detect_all(
    observations: &[price_observation::Model],
    now: DateTime<Utc>,
    freshness: Duration,
    min_discount_percent: Decimal
) -> Vec<Deal> {
    let mut pairs: BTreeMap<(i32, i32), Vec<price_observation::Model>> = BTreeMap::new();
    for observation in observations {
        pairs
            .entry((observation.product_id, observation.store_id))
            .or_default()
            .push(observation.clone());
    }

    pairs
        .values()
        .filter_map(|pair| {
            let current = normalizer::current_price(pair, now, freshness)?;
            detect_deal(pair, &current, now, min_discount_percent)
        })
        .collect()
}

/// Total order over deals: discount descending, then current price
/// ascending, then product and store id. Identical inputs always rank
/// identically.
pub fn rank(mut deals: Vec<Deal>, limit: usize) -> Vec<Deal> {
    deals.sort_by(|a, b| {
        b.discount_percent
            .cmp(&a.discount_percent)
            .then(a.current_price.cmp(&b.current_price))
            .then(a.product_id.cmp(&b.product_id))
            .then(a.store_id.cmp(&b.store_id))
    });
    deals.truncate(limit);
    deals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn obs(
        id: i64,
        price: Decimal,
        observed_at: DateTime<Utc>
    ) -> price_observation::Model {
        price_observation::Model {
            id,
            product_id: 1,
            store_id: 10,
            price,
            currency: "USD".to_string(),
            observed_at,
            is_sale: false,
            sale_end: None,
        }
    }

    fn current(observation: &price_observation::Model) -> CurrentPrice {
        CurrentPrice {
            observation_id: observation.id,
            product_id: observation.product_id,
            store_id: observation.store_id,
            price: observation.price,
            currency: observation.currency.clone(),
            is_sale: observation.is_sale,
            sale_end: observation.sale_end,
            observed_at: observation.observed_at,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-15T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn deal(product_id: i32, store_id: i32, discount_tenths: i64, price_cents: i64) -> Deal {
        Deal {
            product_id,
            store_id,
            current_price: Decimal::new(price_cents, 2),
            baseline_price: Decimal::new(1000, 2),
            discount_percent: Decimal::new(discount_tenths, 1),
            is_sale: false,
        }
    }

    #[test]
    fn test_single_observation_has_no_baseline() {
        let only = obs(1, Decimal::new(1200, 2), days_ago(0));
        let latest = current(&only);

        assert!(baseline_price(&[only], &latest, now()).is_none());
        assert!(detect_deal(&[], &latest, now(), Decimal::new(5, 0)).is_none());
    }

    #[test]
    fn test_price_rise_is_not_a_deal() {
        // $10 then $8 then $12: baseline is $9, the price went up.
        let observations = vec![
            obs(1, Decimal::new(1000, 2), days_ago(2)),
            obs(2, Decimal::new(800, 2), days_ago(1)),
            obs(3, Decimal::new(1200, 2), days_ago(0))
        ];
        let latest = current(&observations[2]);

        let baseline = baseline_price(&observations, &latest, now()).unwrap();
        assert_eq!(baseline, Decimal::new(900, 2));

        assert!(detect_deal(&observations, &latest, now(), Decimal::new(5, 0)).is_none());
    }

    #[test]
    fn test_drop_below_baseline_is_a_deal() {
        let observations = vec![
            obs(1, Decimal::new(1000, 2), days_ago(3)),
            obs(2, Decimal::new(1000, 2), days_ago(2)),
            obs(3, Decimal::new(800, 2), days_ago(0))
        ];
        let latest = current(&observations[2]);

        let deal = detect_deal(&observations, &latest, now(), Decimal::new(5, 0)).unwrap();
        assert_eq!(deal.baseline_price, Decimal::new(1000, 2));
        assert_eq!(deal.discount_percent, Decimal::new(200, 1));
    }

    #[test]
    fn test_discount_below_threshold_is_not_a_deal() {
        let observations = vec![
            obs(1, Decimal::new(1000, 2), days_ago(2)),
            obs(2, Decimal::new(1000, 2), days_ago(1)),
            obs(3, Decimal::new(960, 2), days_ago(0))
        ];
        let latest = current(&observations[2]);

        // 4.0% off, threshold is 5%
        assert!(detect_deal(&observations, &latest, now(), Decimal::new(5, 0)).is_none());
    }

    #[test]
    fn test_discount_rounds_to_one_decimal() {
        assert_eq!(
            discount_percent(Decimal::new(900, 2), Decimal::new(850, 2)),
            Decimal::new(56, 1)
        );
    }

    #[test]
    fn test_rank_orders_by_discount_then_price() {
        let ranked = rank(
            vec![
                deal(1, 10, 100, 500),
                deal(2, 10, 250, 700),
                deal(3, 10, 100, 400)
            ],
            10
        );

        let ids: Vec<i32> = ranked.iter().map(|d| d.product_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_is_stable_across_reruns() {
        let deals = vec![
            deal(5, 20, 150, 300),
            deal(5, 10, 150, 300),
            deal(2, 10, 150, 300)
        ];

        let first = rank(deals.clone(), 10);
        let second = rank(deals, 10);
        assert_eq!(first, second);

        let keys: Vec<(i32, i32)> = first.iter().map(|d| (d.product_id, d.store_id)).collect();
        assert_eq!(keys, vec![(2, 10), (5, 10), (5, 20)]);
    }

    #[test]
    fn test_detect_all_checks_each_pair_against_its_own_baseline() {
        let mut other_store = obs(4, Decimal::new(500, 2), days_ago(2));
        other_store.store_id = 20;
        let mut other_store_drop = obs(5, Decimal::new(400, 2), days_ago(0));
        other_store_drop.store_id = 20;

        let observations = vec![
            // store 10: stable price, no deal
            obs(1, Decimal::new(1000, 2), days_ago(2)),
            obs(2, Decimal::new(1000, 2), days_ago(0)),
            // store 20: 20% drop
            other_store,
            other_store_drop
        ];

        let found = detect_all(
            &observations,
            now(),
            Duration::hours(48),
            Decimal::new(5, 0)
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].store_id, 20);
        assert_eq!(found[0].discount_percent, Decimal::new(200, 1));
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let ranked = rank(
            vec![deal(1, 10, 100, 500), deal(2, 10, 200, 500), deal(3, 10, 300, 500)],
            2
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, 3);
    }
}
