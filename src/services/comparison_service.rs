use std::collections::{ BTreeMap, HashMap };
use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::db::entity::price_observation;
use crate::db::{ CatalogRepository, PriceObservationRepository };
use crate::engine::{ comparator, normalizer };
use crate::error::{ AppError, ErrorDetail, Result };

const MAX_COMPARE_PRODUCTS: usize = 100;

/// Cross-store comparison for a batch of products. One product failing to
/// resolve never aborts the batch; failures are reported per item.
pub struct ComparisonService {
    observations: Arc<PriceObservationRepository>,
    catalog: Arc<CatalogRepository>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorePrice {
    pub store_id: i32,
    pub store_name: String,
    pub price: Decimal,
    pub currency: String,
    pub is_sale: bool,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductComparison {
    pub product_id: i32,
    pub product_name: String,
    pub prices: Vec<StorePrice>,
    pub lowest: StorePrice,
    /// store name -> premium over the lowest price; the cheapest store
    /// maps to zero.
    pub price_difference: BTreeMap<String, Decimal>,
}

#[derive(Serialize)]
pub struct ComparisonEntry {
    pub product_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ProductComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl ComparisonService {
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

    pub async fn compare(&self, product_ids: Vec<i32>) -> Result<Vec<ComparisonEntry>> {
        if product_ids.len() > MAX_COMPARE_PRODUCTS {
            return Err(
                AppError::InvalidInput(
                    format!("at most {} products can be compared at once", MAX_COMPARE_PRODUCTS)
                )
            );
        }

        let products: HashMap<i32, _> = self.catalog
            .find_products(&product_ids).await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let now = self.clock.now();
        let freshness = Duration::hours(self.settings.freshness_hours);

        let known_ids: Vec<i32> = product_ids
            .iter()
            .copied()
            .filter(|id| products.contains_key(id))
            .collect();
        let observations = self.observations.find_for_products(
            &known_ids,
            now - freshness
        ).await?;

        let mut by_product: HashMap<i32, Vec<price_observation::Model>> = HashMap::new();
        for observation in observations {
            by_product.entry(observation.product_id).or_default().push(observation);
        }

        let store_ids: Vec<i32> = by_product
            .values()
            .flatten()
            .map(|o| o.store_id)
            .collect();
        let store_names: HashMap<i32, String> = self.catalog
            .find_stores(&store_ids).await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let entries = product_ids
            .into_iter()
            .map(|product_id| {
                let Some(product) = products.get(&product_id) else {
                    return ComparisonEntry {
                        product_id,
                        comparison: None,
                        error: Some(
                            AppError::ProductNotFound(product_id).to_error_response().error
                        ),
                    };
                };

                let empty = vec![];
                let product_observations = by_product.get(&product_id).unwrap_or(&empty);
                let prices = normalizer::current_prices(product_observations, now, freshness);

                match comparator::compare(product_id, prices) {
                    Some(comparison) => ComparisonEntry {
                        product_id,
                        comparison: Some(
                            Self::decorate(comparison, &product.name, &store_names)
                        ),
                        error: None,
                    },
                    None => ComparisonEntry {
                        product_id,
                        comparison: None,
                        error: Some(
                            AppError::NoData(
                                format!("no current prices for product {}", product_id)
                            )
                                .to_error_response().error
                        ),
                    },
                }
            })
            .collect();

        Ok(entries)
    }

    fn decorate(
        comparison: comparator::PriceComparison,
        product_name: &str,
        store_names: &HashMap<i32, String>
    ) -> ProductComparison {
        let name_of = |store_id: i32| {
            store_names
                .get(&store_id)
                .cloned()
                .unwrap_or_else(|| format!("store {}", store_id))
        };

        let to_store_price = |p: &normalizer::CurrentPrice| StorePrice {
            store_id: p.store_id,
            store_name: name_of(p.store_id),
            price: p.price,
            currency: p.currency.clone(),
            is_sale: p.is_sale,
            observed_at: p.observed_at,
        };

        ProductComparison {
            product_id: comparison.product_id,
            product_name: product_name.to_string(),
            prices: comparison.prices.iter().map(to_store_price).collect(),
            lowest: to_store_price(&comparison.lowest),
            price_difference: comparison.differences
                .into_iter()
                .map(|(store_id, delta)| (name_of(store_id), delta))
                .collect(),
        }
    }
}
