use std::collections::{ BTreeSet, HashMap };
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::db::entity::{ price_alert, price_observation };
use crate::db::{ AlertRepository, CatalogRepository, PriceObservationRepository };
use crate::engine::alerts;
use crate::engine::normalizer::{ self, CurrentPrice };
use crate::error::{ AppError, Result };

/// Matches user target prices against current prices. Targets are owned by
/// the user-preference surface; evaluation is read-only and on demand.
pub struct AlertService {
    alerts: Arc<AlertRepository>,
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    pub user_id: String,
    pub product_id: i32,
    pub target_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceAlertResponse {
    pub product_id: i32,
    pub product_name: String,
    pub store_id: i32,
    pub store_name: String,
    pub current_price: Decimal,
    pub currency: String,
    pub target_price: Decimal,
    pub savings: Decimal,
}

impl AlertService {
    pub fn new(
        alerts: Arc<AlertRepository>,
        observations: Arc<PriceObservationRepository>,
        catalog: Arc<CatalogRepository>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings
    ) -> Self {
        Self {
            alerts,
            observations,
            catalog,
            clock,
            settings,
        }
    }

    pub async fn create_alert(&self, request: CreateAlertRequest) -> Result<price_alert::Model> {
        if request.target_price <= Decimal::ZERO {
            return Err(
                AppError::InvalidInput(
                    format!("target_price must be positive, got {}", request.target_price)
                )
            );
        }

        self.catalog.find_product(request.product_id).await?;

        let alert = self.alerts.create(
            request.user_id,
            request.product_id,
            request.target_price
        ).await?;

        tracing::info!(
            "Created alert {} for product {} at target {}",
            alert.id,
            alert.product_id,
            alert.target_price
        );

        Ok(alert)
    }

    /// One alert per active target whose product's lowest current price is
    /// at or below it. Targets without fresh price data are skipped.
    pub async fn evaluate(&self, user_id: &str) -> Result<Vec<PriceAlertResponse>> {
        let rows = self.alerts.find_active_for_user(user_id).await?;
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let product_ids: Vec<i32> = rows
            .iter()
            .map(|a| a.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let now = self.clock.now();
        let freshness = Duration::hours(self.settings.freshness_hours);

        let observations = self.observations.find_for_products(
            &product_ids,
            now - freshness
        ).await?;

        let mut by_product: HashMap<i32, Vec<price_observation::Model>> = HashMap::new();
        for observation in observations {
            by_product.entry(observation.product_id).or_default().push(observation);
        }

        let lowest: HashMap<i32, CurrentPrice> = by_product
            .into_iter()
            .filter_map(|(product_id, product_observations)| {
                normalizer
                    ::current_prices(&product_observations, now, freshness)
                    .into_iter()
                    .next()
                    .map(|price| (product_id, price))
            })
            .collect();

        let targets: Vec<(i32, Decimal)> = rows
            .iter()
            .map(|a| (a.product_id, a.target_price))
            .collect();

        let matches = alerts::evaluate(&targets, &lowest);

        let products: HashMap<i32, String> = self.catalog
            .find_products(&product_ids).await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let store_ids: Vec<i32> = matches
            .iter()
            .map(|m| m.current.store_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let stores: HashMap<i32, String> = self.catalog
            .find_stores(&store_ids).await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(
            matches
                .into_iter()
                .map(|m| PriceAlertResponse {
                    product_id: m.product_id,
                    product_name: products
                        .get(&m.product_id)
                        .cloned()
                        .unwrap_or_else(|| format!("product {}", m.product_id)),
                    store_id: m.current.store_id,
                    store_name: stores
                        .get(&m.current.store_id)
                        .cloned()
                        .unwrap_or_else(|| format!("store {}", m.current.store_id)),
                    current_price: m.current.price,
                    currency: m.current.currency,
                    target_price: m.target_price,
                    savings: m.savings,
                })
                .collect()
        )
    }

    /// Idempotent: deleting an alert that is already gone succeeds.
    pub async fn delete_alert(&self, id: Uuid, user_id: &str) -> Result<()> {
        let removed = self.alerts.delete(id, user_id).await?;
        tracing::debug!("Deleted {} alert rows for {}", removed, id);
        Ok(())
    }
}
