use std::collections::{ BTreeMap, HashMap, HashSet };
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::db::{ CatalogRepository, PriceObservationRepository };
use crate::engine::deals::{ self, Deal };
use crate::engine::savings;
use crate::error::{ AppError, Result };

/// Aggregates realized savings from qualifying deals over a window.
pub struct AnalyticsService {
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsResponse {
    pub window_days: i64,
    pub total_savings: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
}

impl AnalyticsService {
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

    /// Savings per category over the last `days` days: each product's best
    /// deal contributes its baseline-minus-current once. Categories without
    /// qualifying deals are absent from the breakdown, not zero-valued.
    pub async fn savings_since(&self, days: i64) -> Result<SavingsResponse> {
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

        let now = self.clock.now();
        let observations = self.observations.find_since(now - Duration::days(days)).await?;

        let found = deals::detect_all(
            &observations,
            now,
            Duration::hours(self.settings.freshness_hours),
            self.settings.min_discount_percent
        );

        // Best-ranked deal per product; rank order makes the pick total.
        let ranked = deals::rank(found, usize::MAX);
        let mut seen: HashSet<i32> = HashSet::new();
        let best_per_product: Vec<Deal> = ranked
            .into_iter()
            .filter(|deal| seen.insert(deal.product_id))
            .collect();

        let product_ids: Vec<i32> = best_per_product
            .iter()
            .map(|d| d.product_id)
            .collect();
        let categories: HashMap<i32, Option<String>> = self.catalog
            .find_products(&product_ids).await?
            .into_iter()
            .map(|p| (p.id, p.category))
            .collect();

        let with_categories: Vec<(Deal, Option<String>)> = best_per_product
            .into_iter()
            .map(|deal| {
                let category = categories.get(&deal.product_id).cloned().flatten();
                (deal, category)
            })
            .collect();

        let breakdown = savings::aggregate(&with_categories);

        Ok(SavingsResponse {
            window_days: days,
            total_savings: breakdown.total_savings,
            by_category: breakdown.by_category,
        })
    }
}
