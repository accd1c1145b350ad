use std::collections::HashMap;
use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::db::{ CatalogRepository, PriceObservationRepository };
use crate::engine::history::{ self, PriceHistoryPoint };
use crate::engine::normalizer::{ self, CurrentPrice };
use crate::engine::predictor::{ self, PricePrediction };
use crate::error::{ AppError, Result };

/// Current prices, history series, and forward projections for a product.
pub struct PriceService {
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentPriceResponse {
    pub product_id: i32,
    pub store_id: i32,
    pub store_name: String,
    pub price: Decimal,
    pub currency: String,
    pub is_sale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<DateTime<Utc>>,
    pub observed_at: DateTime<Utc>,
}

impl PriceService {
    pub fn new(
        observations: Arc<PriceObservationRepository>,
        catalog: Arc<CatalogRepository>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings
    ) -> Self {
        Self {
            observations,
            catalog,
            clock,
            settings,
        }
    }

    /// One current price per store with fresh data, cheapest first. An empty
    /// list means no store has observed the product recently.
    pub async fn current_prices(&self, product_id: i32) -> Result<Vec<CurrentPriceResponse>> {
        self.catalog.find_product(product_id).await?;

        let now = self.clock.now();
        let freshness = Duration::hours(self.settings.freshness_hours);

        let observations = self.observations.query(product_id, None, now - freshness, now).await?;
        let prices = normalizer::current_prices(&observations, now, freshness);

        self.with_store_names(prices).await
    }

    pub async fn price_history(
        &self,
        product_id: i32,
        store_id: Option<i32>,
        days: i64
    ) -> Result<Vec<PriceHistoryPoint>> {
        self.check_window(days)?;
        self.catalog.find_product(product_id).await?;

        let now = self.clock.now();
        let observations = self.observations.query(
            product_id,
            store_id,
            now - Duration::days(days),
            now
        ).await?;

        history::daily_history(&observations, store_id, days, now)
    }

    /// Linear projection `days_ahead` days out, from the store-agnostic
    /// daily series of the last 30 days.
    pub async fn predict_price(&self, product_id: i32, days_ahead: i64) -> Result<PricePrediction> {
        if days_ahead <= 0 {
            return Err(
                AppError::InvalidRange(format!("days_ahead must be positive, got {}", days_ahead))
            );
        }
        if days_ahead > self.settings.max_prediction_days {
            return Err(
                AppError::InvalidRange(
                    format!("days_ahead must be at most {}", self.settings.max_prediction_days)
                )
            );
        }

        self.catalog.find_product(product_id).await?;

        let now = self.clock.now();
        let observations = self.observations.query(
            product_id,
            None,
            now - Duration::days(predictor::HISTORY_WINDOW_DAYS),
            now
        ).await?;

        if observations.is_empty() {
            return Err(
                AppError::NoData(format!("no recent observations for product {}", product_id))
            );
        }

        let series = history::daily_history(
            &observations,
            None,
            predictor::HISTORY_WINDOW_DAYS,
            now
        )?;

        // Fallback anchor for thin histories: the newest observation on
        // record, fresh or not.
        let last_known = observations
            .iter()
            .max_by_key(|o| (o.observed_at, o.id))
            .map(|o| o.price)
            .unwrap_or(Decimal::ZERO);

        Ok(predictor::predict(product_id, &series, last_known, days_ahead))
    }

    fn check_window(&self, days: i64) -> Result<()> {
        if days <= 0 {
            return Err(AppError::InvalidRange(format!("days must be positive, got {}", days)));
        }
        if days > self.settings.max_window_days {
            return Err(
                AppError::InvalidRange(
                    format!("days must be at most {}", self.settings.max_window_days)
                )
            );
        }
        Ok(())
    }

    async fn with_store_names(
        &self,
        prices: Vec<CurrentPrice>
    ) -> Result<Vec<CurrentPriceResponse>> {
        let store_ids: Vec<i32> = prices.iter().map(|p| p.store_id).collect();
        let stores = self.catalog.find_stores(&store_ids).await?;
        let names: HashMap<i32, String> = stores
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(
            prices
                .into_iter()
                .map(|p| CurrentPriceResponse {
                    product_id: p.product_id,
                    store_id: p.store_id,
                    store_name: names
                        .get(&p.store_id)
                        .cloned()
                        .unwrap_or_else(|| format!("store {}", p.store_id)),
                    price: p.price,
                    currency: p.currency,
                    is_sale: p.is_sale,
                    sale_end: p.sale_end,
                    observed_at: p.observed_at,
                })
                .collect()
        )
    }
}
