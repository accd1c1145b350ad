use sea_orm::{ entity::prelude::*, DatabaseConnection };

use crate::db::entity;
use crate::error::{ AppError, Result };

/// Read-only view of the product/store catalog. The catalog service owns
/// these tables; the engine resolves ids and descriptive fields from them.
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_product(&self, id: i32) -> Result<entity::product::Model> {
        entity::product::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::ProductNotFound(id))
    }

    pub async fn find_store(&self, id: i32) -> Result<entity::store::Model> {
        entity::store::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::StoreNotFound(id))
    }

    pub async fn find_products(&self, ids: &[i32]) -> Result<Vec<entity::product::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let products = entity::product::Entity
            ::find()
            .filter(entity::product::Column::Id.is_in(ids.to_vec()))
            .all(&self.db).await?;

        Ok(products)
    }

    pub async fn find_products_in_category(
        &self,
        category: &str
    ) -> Result<Vec<entity::product::Model>> {
        let products = entity::product::Entity
            ::find()
            .filter(entity::product::Column::Category.eq(category))
            .all(&self.db).await?;

        Ok(products)
    }

    pub async fn find_stores(&self, ids: &[i32]) -> Result<Vec<entity::store::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let stores = entity::store::Entity
            ::find()
            .filter(entity::store::Column::Id.is_in(ids.to_vec()))
            .all(&self.db).await?;

        Ok(stores)
    }
}
