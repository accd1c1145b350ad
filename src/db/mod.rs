use chrono::{ DateTime, Utc };
use sea_orm::{
    entity::prelude::*,
    DatabaseConnection,
    QueryOrder,
    Set,
};

use crate::error::Result;

pub mod entity;
pub use entity::*;

mod catalog_repository;
pub use catalog_repository::CatalogRepository;

mod alert_repository;
pub use alert_repository::AlertRepository;

/// Append-only log of price observations. Rows are inserted and read, never
/// updated or deleted; every read is bounded by a time window.
pub struct PriceObservationRepository {
    db: DatabaseConnection,
}

impl PriceObservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        &self,
        product_id: i32,
        store_id: i32,
        price: Decimal,
        currency: String,
        observed_at: DateTime<Utc>,
        is_sale: bool,
        sale_end: Option<DateTime<Utc>>
    ) -> Result<entity::price_observation::Model> {
        let observation = entity::price_observation::ActiveModel {
            product_id: Set(product_id),
            store_id: Set(store_id),
            price: Set(price),
            currency: Set(currency),
            observed_at: Set(observed_at),
            is_sale: Set(is_sale),
            sale_end: Set(sale_end),
            ..Default::default()
        };

        let observation = observation.insert(&self.db).await?;
        Ok(observation)
    }

    /// Observations for one product in [since, until], oldest first,
    /// optionally restricted to one store. Insertion order breaks
    /// observed-at ties so repeated reads are identical.
    pub async fn query(
        &self,
        product_id: i32,
        store_id: Option<i32>,
        since: DateTime<Utc>,
        until: DateTime<Utc>
    ) -> Result<Vec<entity::price_observation::Model>> {
        let mut select = entity::price_observation::Entity
            ::find()
            .filter(entity::price_observation::Column::ProductId.eq(product_id))
            .filter(entity::price_observation::Column::ObservedAt.gte(since))
            .filter(entity::price_observation::Column::ObservedAt.lte(until));

        if let Some(store_id) = store_id {
            select = select.filter(entity::price_observation::Column::StoreId.eq(store_id));
        }

        let observations = select
            .order_by_asc(entity::price_observation::Column::ObservedAt)
            .order_by_asc(entity::price_observation::Column::Id)
            .all(&self.db).await?;

        Ok(observations)
    }

    /// Window-bounded scan across all products, for deal ranking.
    pub async fn find_since(
        &self,
        since: DateTime<Utc>
    ) -> Result<Vec<entity::price_observation::Model>> {
        let observations = entity::price_observation::Entity
            ::find()
            .filter(entity::price_observation::Column::ObservedAt.gte(since))
            .order_by_asc(entity::price_observation::Column::ObservedAt)
            .order_by_asc(entity::price_observation::Column::Id)
            .all(&self.db).await?;

        Ok(observations)
    }

    pub async fn find_for_products(
        &self,
        product_ids: &[i32],
        since: DateTime<Utc>
    ) -> Result<Vec<entity::price_observation::Model>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }

        let observations = entity::price_observation::Entity
            ::find()
            .filter(entity::price_observation::Column::ProductId.is_in(product_ids.to_vec()))
            .filter(entity::price_observation::Column::ObservedAt.gte(since))
            .order_by_asc(entity::price_observation::Column::ObservedAt)
            .order_by_asc(entity::price_observation::Column::Id)
            .all(&self.db).await?;

        Ok(observations)
    }
}
