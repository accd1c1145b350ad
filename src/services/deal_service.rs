use std::collections::{ BTreeSet, HashMap };
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::db::{ CatalogRepository, PriceObservationRepository };
use crate::engine::deals::{ self, Deal };
use crate::error::Result;

const DEFAULT_DEAL_LIMIT: u64 = 10;

/// Ranks current prices against their rolling baselines.
pub struct DealService {
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealResponse {
    pub product_id: i32,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub store_id: i32,
    pub store_name: String,
    pub current_price: Decimal,
    pub baseline_price: Decimal,
    pub discount_percent: Decimal,
    pub is_sale: bool,
}

impl DealService {
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

    /// Best current deals, optionally restricted to one category. Identical
    /// observation sets always rank identically.
    pub async fn best_deals(
        &self,
        category: Option<&str>,
        limit: Option<u64>
    ) -> Result<Vec<DealResponse>> {
        let limit = limit.unwrap_or(DEFAULT_DEAL_LIMIT).min(self.settings.max_deal_limit) as usize;

        let now = self.clock.now();
        let since = now - Duration::days(self.settings.baseline_days);

        let observations = match category {
            Some(category) => {
                let products = self.catalog.find_products_in_category(category).await?;
                let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
                self.observations.find_for_products(&ids, since).await?
            }
            None => self.observations.find_since(since).await?,
        };

        let found = deals::detect_all(
            &observations,
            now,
            Duration::hours(self.settings.freshness_hours),
            self.settings.min_discount_percent
        );
        let ranked = deals::rank(found, limit);

        tracing::debug!("Ranked {} deals (category: {:?})", ranked.len(), category);

        self.decorate(ranked).await
    }

    async fn decorate(&self, deals: Vec<Deal>) -> Result<Vec<DealResponse>> {
        let product_ids: Vec<i32> = deals
            .iter()
            .map(|d| d.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let store_ids: Vec<i32> = deals
            .iter()
            .map(|d| d.store_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let products: HashMap<i32, _> = self.catalog
            .find_products(&product_ids).await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let stores: HashMap<i32, String> = self.catalog
            .find_stores(&store_ids).await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(
            deals
                .into_iter()
                .map(|deal| {
                    let product = products.get(&deal.product_id);

                    DealResponse {
                        product_id: deal.product_id,
                        product_name: product
                            .map(|p| p.name.clone())
                            .unwrap_or_else(|| format!("product {}", deal.product_id)),
                        category: product.and_then(|p| p.category.clone()),
                        store_id: deal.store_id,
                        store_name: stores
                            .get(&deal.store_id)
                            .cloned()
                            .unwrap_or_else(|| format!("store {}", deal.store_id)),
                        current_price: deal.current_price,
                        baseline_price: deal.baseline_price,
                        discount_percent: deal.discount_percent,
                        is_sale: deal.is_sale,
                    }
                })
                .collect()
        )
    }
}
