use std::collections::BTreeMap;

use chrono::{ DateTime, Duration, NaiveDate, Utc };
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::entity::price_observation;
use crate::error::{ AppError, Result };

/// Average price for one daily bucket. `store_id` is None for the
/// store-agnostic trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistoryPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i32>,
    pub average_price: Decimal,
}

/// Buckets observations into `days` daily buckets ending today, averaging
/// same-bucket prices. Buckets with no observations are omitted, never
/// interpolated; the result is ascending by date.
pub fn daily_history(
    observations: &[price_observation::Model],
    store_id: Option<i32>,
    days: i64,
    now: DateTime<Utc>
) -> Result<Vec<PriceHistoryPoint>> {
    if days <= 0 {
        return Err(AppError::InvalidRange(format!("days must be positive, got {}", days)));
    }

    let end = now.date_naive();
    let start = end - Duration::days(days - 1);

    let mut buckets: BTreeMap<NaiveDate, Vec<Decimal>> = BTreeMap::new();
    for observation in observations {
        if let Some(store) = store_id {
            if observation.store_id != store {
                continue;
            }
        }
        if observation.observed_at > now {
            continue;
        }

        let date = observation.observed_at.date_naive();
        if date < start || date > end {
            continue;
        }

        buckets.entry(date).or_default().push(observation.price);
    }

    let points = buckets
        .into_iter()
        .map(|(date, prices)| {
            let sum: Decimal = prices.iter().copied().sum();
            let average = sum / Decimal::from(prices.len() as u64);

            PriceHistoryPoint {
                date,
                store_id,
                average_price: average.round_dp(2),
            }
        })
        .collect();

    Ok(points)
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

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-03T18:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    #[test]
    fn test_three_day_series_ascending() {
        let observations = vec![
            obs(1, 10, Decimal::new(1000, 2), days_ago(2)),
            obs(2, 10, Decimal::new(800, 2), days_ago(1)),
            obs(3, 10, Decimal::new(1200, 2), days_ago(0))
        ];

        let points = daily_history(&observations, None, 3, now()).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].average_price, Decimal::new(1000, 2));
        assert_eq!(points[1].average_price, Decimal::new(800, 2));
        assert_eq!(points[2].average_price, Decimal::new(1200, 2));
        assert!(points[0].date < points[1].date && points[1].date < points[2].date);
    }

    #[test]
    fn test_same_bucket_prices_are_averaged() {
        let observations = vec![
            obs(1, 10, Decimal::new(1000, 2), days_ago(1)),
            obs(2, 20, Decimal::new(1200, 2), days_ago(1))
        ];

        let points = daily_history(&observations, None, 7, now()).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].average_price, Decimal::new(1100, 2));
    }

    #[test]
    fn test_store_filter_restricts_the_series() {
        let observations = vec![
            obs(1, 10, Decimal::new(1000, 2), days_ago(1)),
            obs(2, 20, Decimal::new(1200, 2), days_ago(1))
        ];

        let points = daily_history(&observations, Some(20), 7, now()).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].store_id, Some(20));
        assert_eq!(points[0].average_price, Decimal::new(1200, 2));
    }

    #[test]
    fn test_empty_buckets_are_omitted() {
        let observations = vec![
            obs(1, 10, Decimal::new(1000, 2), days_ago(4)),
            obs(2, 10, Decimal::new(900, 2), days_ago(0))
        ];

        let points = daily_history(&observations, None, 7, now()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_observations_outside_the_window_are_ignored() {
        let observations = vec![
            obs(1, 10, Decimal::new(1000, 2), days_ago(10)),
            obs(2, 10, Decimal::new(900, 2), days_ago(0))
        ];

        let points = daily_history(&observations, None, 3, now()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].average_price, Decimal::new(900, 2));
    }

    #[test]
    fn test_point_wire_shape() {
        let observations = vec![obs(1, 10, Decimal::new(1000, 2), days_ago(1))];
        let points = daily_history(&observations, None, 7, now()).unwrap();

        let json = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(json["average_price"], "10.00");
        // the aggregate series carries no store id at all
        assert!(json.get("store_id").is_none());
    }

    #[test]
    fn test_non_positive_days_is_rejected() {
        assert!(matches!(
            daily_history(&[], None, 0, now()),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            daily_history(&[], None, -5, now()),
            Err(AppError::InvalidRange(_))
        ));
    }
}
