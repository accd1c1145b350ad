use std::env;

use anyhow::Context;
use rust_decimal::Decimal;

/// Tunables for the derived-price computations. Every window is bounded so
/// no query ever scans the observation log unboundedly.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// How old an observation may be and still count as "current".
    pub freshness_hours: i64,
    /// Rolling window used for deal baselines.
    pub baseline_days: i64,
    /// Minimum discount percentage for an observation to qualify as a deal.
    pub min_discount_percent: Decimal,
    /// Upper bound for any caller-supplied `days` window.
    pub max_window_days: i64,
    /// Upper bound for prediction horizons.
    pub max_prediction_days: i64,
    /// Cap applied to `limit` on deal queries.
    pub max_deal_limit: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            freshness_hours: 24,
            baseline_days: 30,
            min_discount_percent: Decimal::new(5, 0),
            max_window_days: 365,
            max_prediction_days: 90,
            max_deal_limit: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub engine: EngineSettings,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("SERVER_PORT must be a valid port number")?;

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            freshness_hours: parse_or(
                "PRICE_FRESHNESS_HOURS",
                defaults.freshness_hours
            )?,
            baseline_days: parse_or("DEAL_BASELINE_DAYS", defaults.baseline_days)?,
            min_discount_percent: parse_or(
                "MIN_DISCOUNT_PERCENT",
                defaults.min_discount_percent
            )?,
            max_window_days: parse_or("MAX_WINDOW_DAYS", defaults.max_window_days)?,
            max_prediction_days: parse_or(
                "MAX_PREDICTION_DAYS",
                defaults.max_prediction_days
            )?,
            max_deal_limit: parse_or("MAX_DEAL_LIMIT", defaults.max_deal_limit)?,
        };

        if engine.freshness_hours <= 0 {
            anyhow::bail!("PRICE_FRESHNESS_HOURS must be positive");
        }
        if engine.baseline_days <= 0 {
            anyhow::bail!("DEAL_BASELINE_DAYS must be positive");
        }
        if engine.max_window_days <= 0 {
            anyhow::bail!("MAX_WINDOW_DAYS must be positive");
        }

        Ok(Config {
            database_url,
            server_host,
            server_port,
            engine,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
    where T::Err: std::fmt::Display
{
    match env::var(key) {
        Ok(raw) =>
            raw
                .parse()
                .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        Err(_) => Ok(default),
    }
}
