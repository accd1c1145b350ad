use std::collections::HashMap;

use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::entity::price_observation;

/// The resolved "price right now" for one (product, store) pair. Derived,
/// never stored; at most one exists per pair at query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPrice {
    pub observation_id: i64,
    pub product_id: i32,
    pub store_id: i32,
    pub price: Decimal,
    pub currency: String,
    pub is_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<DateTime<Utc>>,
    pub observed_at: DateTime<Utc>,
}

impl CurrentPrice {
    fn from_observation(observation: &price_observation::Model, now: DateTime<Utc>) -> Self {
        // The stored row keeps is_sale = true forever; the derived value
        // drops the flag once the sale window has closed.
        let sale_expired = observation.sale_end.map(|end| end <= now).unwrap_or(false);

        Self {
            observation_id: observation.id,
            product_id: observation.product_id,
            store_id: observation.store_id,
            price: observation.price,
            currency: observation.currency.clone(),
            is_sale: observation.is_sale && !sale_expired,
            sale_end: observation.sale_end,
            observed_at: observation.observed_at,
        }
    }
}

/// Freshest observation in the window for a single (product, store) slice,
/// or None when nothing qualifies. Ties on observed_at resolve to the
/// later-appended row so the result is a total order.
pub fn current_price(
    observations: &[price_observation::Model],
    now: DateTime<Utc>,
    freshness: Duration
) -> Option<CurrentPrice> {
    let cutoff = now - freshness;

    observations
        .iter()
        .filter(|o| o.observed_at >= cutoff && o.observed_at <= now)
        .max_by_key(|o| (o.observed_at, o.id))
        .map(|o| CurrentPrice::from_observation(o, now))
}

/// One CurrentPrice per store with fresh data for a product slice, cheapest
/// first, ties broken by store id ascending.
pub fn current_prices(
    observations: &[price_observation::Model],
    now: DateTime<Utc>,
    freshness: Duration
) -> Vec<CurrentPrice> {
    let cutoff = now - freshness;

    let mut freshest: HashMap<i32, &price_observation::Model> = HashMap::new();
    for observation in observations {
        if observation.observed_at < cutoff || observation.observed_at > now {
            continue;
        }

        let newer = match freshest.get(&observation.store_id) {
            Some(best) => (observation.observed_at, observation.id) > (best.observed_at, best.id),
            None => true,
        };
        if newer {
            freshest.insert(observation.store_id, observation);
        }
    }

    let mut prices: Vec<CurrentPrice> = freshest
        .into_values()
        .map(|o| CurrentPrice::from_observation(o, now))
        .collect();

    prices.sort_by(|a, b| a.price.cmp(&b.price).then(a.store_id.cmp(&b.store_id)));
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(
        id: i64,
        store_id: i32,
        price: Decimal,
        observed_at: DateTime<Utc>
    ) -> price_observation::Model {
        price_observation::Model {
            id,
            product_id: 1,
            store_id,
            price,
            currency: "USD".to_string(),
            observed_at,
            is_sale: false,
            sale_end: None,
        }
    }

    fn at(hours_ago: i64) -> DateTime<Utc> {
        now() - Duration::hours(hours_ago)
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-15T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_record_then_read_round_trip() {
        let recorded = obs(1, 10, Decimal::new(499, 2), at(1));
        let current = current_price(&[recorded.clone()], now(), Duration::hours(24)).unwrap();

        assert_eq!(current.observation_id, recorded.id);
        assert_eq!(current.price, recorded.price);
        assert_eq!(current.store_id, 10);
    }

    #[test]
    fn test_stale_observation_is_not_current() {
        let stale = obs(1, 10, Decimal::new(499, 2), at(25));
        assert!(current_price(&[stale], now(), Duration::hours(24)).is_none());
    }

    #[test]
    fn test_latest_observation_wins() {
        let older = obs(1, 10, Decimal::new(1000, 2), at(10));
        let newer = obs(2, 10, Decimal::new(1200, 2), at(2));

        let current = current_price(&[older, newer], now(), Duration::hours(24)).unwrap();
        assert_eq!(current.price, Decimal::new(1200, 2));
    }

    #[test]
    fn test_observed_at_tie_resolves_to_later_append() {
        let first = obs(1, 10, Decimal::new(1000, 2), at(2));
        let second = obs(2, 10, Decimal::new(950, 2), at(2));

        let current = current_price(&[first, second], now(), Duration::hours(24)).unwrap();
        assert_eq!(current.observation_id, 2);
    }

    #[test]
    fn test_expired_sale_flag_is_cleared() {
        let mut on_sale = obs(1, 10, Decimal::new(799, 2), at(3));
        on_sale.is_sale = true;
        on_sale.sale_end = Some(at(1));

        let current = current_price(&[on_sale], now(), Duration::hours(24)).unwrap();
        assert!(!current.is_sale);
    }

    #[test]
    fn test_running_sale_flag_is_kept() {
        let mut on_sale = obs(1, 10, Decimal::new(799, 2), at(3));
        on_sale.is_sale = true;
        on_sale.sale_end = Some(now() + Duration::hours(6));

        let current = current_price(&[on_sale], now(), Duration::hours(24)).unwrap();
        assert!(current.is_sale);
    }

    #[test]
    fn test_current_prices_ordered_by_price_then_store() {
        let observations = vec![
            obs(1, 30, Decimal::new(500, 2), at(1)),
            obs(2, 10, Decimal::new(450, 2), at(2)),
            obs(3, 20, Decimal::new(450, 2), at(3))
        ];

        let prices = current_prices(&observations, now(), Duration::hours(24));
        let stores: Vec<i32> = prices.iter().map(|p| p.store_id).collect();
        assert_eq!(stores, vec![10, 20, 30]);
    }

    #[test]
    fn test_current_prices_one_entry_per_store() {
        let observations = vec![
            obs(1, 10, Decimal::new(500, 2), at(5)),
            obs(2, 10, Decimal::new(475, 2), at(1)),
            obs(3, 20, Decimal::new(600, 2), at(2))
        ];

        let prices = current_prices(&observations, now(), Duration::hours(24));
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].store_id, 10);
        assert_eq!(prices[0].price, Decimal::new(475, 2));
    }
}
