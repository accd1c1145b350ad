use std::sync::Arc;

use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::clock::Clock;
use crate::db::entity::price_observation;
use crate::db::{ CatalogRepository, PriceObservationRepository };
use crate::engine::currency;
use crate::error::{ AppError, Result };

pub struct ObservationService {
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordObservationRequest {
    pub product_id: i32,
    pub store_id: i32,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(default)]
    pub sale_end: Option<DateTime<Utc>>,
}

impl ObservationService {
    pub fn new(
        observations: Arc<PriceObservationRepository>,
        catalog: Arc<CatalogRepository>,
        clock: Arc<dyn Clock>
    ) -> Self {
        Self {
            observations,
            catalog,
            clock,
        }
    }

    /// Validate and append one observation. A rejected write leaves no
    /// trace; there is no partial application.
    pub async fn record(
        &self,
        request: RecordObservationRequest
    ) -> Result<price_observation::Model> {
        if request.price <= Decimal::ZERO {
            return Err(
                AppError::InvalidObservation(
                    format!("price must be positive, got {}", request.price)
                )
            );
        }

        if !currency::is_recognized(&request.currency) {
            return Err(
                AppError::InvalidObservation(
                    format!("unrecognized currency code: {}", request.currency)
                )
            );
        }

        // On the write path an unknown id is bad input, not a lookup miss
        self.catalog
            .find_product(request.product_id).await
            .map_err(|e| match e {
                AppError::ProductNotFound(id) =>
                    AppError::InvalidObservation(format!("unknown product id {}", id)),
                other => other,
            })?;
        self.catalog
            .find_store(request.store_id).await
            .map_err(|e| match e {
                AppError::StoreNotFound(id) =>
                    AppError::InvalidObservation(format!("unknown store id {}", id)),
                other => other,
            })?;

        let observed_at = request.observed_at.unwrap_or_else(|| self.clock.now());

        let observation = self.observations.append(
            request.product_id,
            request.store_id,
            request.price,
            request.currency,
            observed_at,
            request.is_sale,
            request.sale_end
        ).await?;

        tracing::debug!(
            "Recorded {} {} for product {} at store {}",
            observation.price,
            observation.currency,
            observation.product_id,
            observation.store_id
        );

        Ok(observation)
    }
}
