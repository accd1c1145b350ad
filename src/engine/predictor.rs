use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::history::PriceHistoryPoint;

/// Below this many daily points a fitted line is noise; fall back to the
/// last known price with zero confidence instead of failing.
pub const MIN_HISTORY_POINTS: usize = 5;

/// The fit always looks at the store-agnostic daily series for this window.
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// Linear-trend projection for a product. Ephemeral, recomputed per
/// request, and bit-for-bit reproducible for a given history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePrediction {
    pub product_id: i32,
    pub days_ahead: i64,
    pub predicted_price: Decimal,
    pub confidence: f64,
}

/// Safely convert a Decimal to f64, returning None on parse failure
fn decimal_to_f64(d: Decimal) -> Option<f64> {
    d.to_string().parse::<f64>().ok()
}

/// Least-squares line over (day-index, average price), evaluated
/// `days_ahead` past the last point and clamped to be non-negative.
/// Confidence is 1 minus the residual standard error relative to the mean
/// price, clamped into [0, 1].
pub fn predict(
    product_id: i32,
    history: &[PriceHistoryPoint],
    last_known_price: Decimal,
    days_ahead: i64
) -> PricePrediction {
    let fallback = PricePrediction {
        product_id,
        days_ahead,
        predicted_price: last_known_price,
        confidence: 0.0,
    };

    if history.len() < MIN_HISTORY_POINTS {
        return fallback;
    }

    let first_date = history[0].date;
    let points: Vec<(f64, f64)> = history
        .iter()
        .filter_map(|p| {
            decimal_to_f64(p.average_price).map(|price| {
                ((p.date - first_date).num_days() as f64, price)
            })
        })
        .collect();

    if points.len() < MIN_HISTORY_POINTS {
        return fallback;
    }

    let n = points.len() as f64;
    let mean_x: f64 = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y: f64 = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxx: f64 = points
        .iter()
        .map(|(x, _)| (x - mean_x).powi(2))
        .sum();
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;

    let last_x = points[points.len() - 1].0;
    let projected = (intercept + slope * (last_x + days_ahead as f64)).max(0.0);

    let sse: f64 = points
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let residual_std_error = (sse / (n - 2.0)).sqrt();
    let confidence = if mean_y > 0.0 {
        (1.0 - residual_std_error / mean_y).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let predicted_price = Decimal::from_f64_retain(projected)
        .map(|d| d.round_dp(2))
        .unwrap_or(last_known_price);

    PricePrediction {
        product_id,
        days_ahead,
        predicted_price,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(prices_cents: &[i64]) -> Vec<PriceHistoryPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        prices_cents
            .iter()
            .enumerate()
            .map(|(i, cents)| PriceHistoryPoint {
                date: start + chrono::Duration::days(i as i64),
                store_id: None,
                average_price: Decimal::new(*cents, 2),
            })
            .collect()
    }

    #[test]
    fn test_short_history_falls_back_with_zero_confidence() {
        let history = series(&[1000, 1010, 1020, 1030]);
        let prediction = predict(1, &history, Decimal::new(1030, 2), 7);

        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.predicted_price, Decimal::new(1030, 2));
    }

    #[test]
    fn test_perfect_linear_trend_extrapolates_exactly() {
        // $10, $11, $12, $13, $14 -> $15 tomorrow, with no residual
        let history = series(&[1000, 1100, 1200, 1300, 1400]);
        let prediction = predict(1, &history, Decimal::new(1400, 2), 1);

        assert_eq!(prediction.predicted_price, Decimal::new(1500, 2));
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_projection_is_clamped_at_zero() {
        let history = series(&[1000, 800, 600, 400, 200]);
        let prediction = predict(1, &history, Decimal::new(200, 2), 5);

        assert_eq!(prediction.predicted_price, Decimal::ZERO);
    }

    #[test]
    fn test_prediction_is_reproducible() {
        let history = series(&[1000, 950, 1025, 975, 990, 1005]);

        let first = predict(1, &history, Decimal::new(1005, 2), 7);
        let second = predict(1, &history, Decimal::new(1005, 2), 7);

        assert_eq!(first, second);
    }

    #[test]
    fn test_noisy_history_lowers_confidence() {
        let flat = series(&[1000, 1000, 1000, 1000, 1000]);
        let noisy = series(&[1000, 400, 1600, 300, 1700]);

        let confident = predict(1, &flat, Decimal::new(1000, 2), 3);
        let shaky = predict(1, &noisy, Decimal::new(1700, 2), 3);

        assert!(confident.confidence > shaky.confidence);
    }
}
