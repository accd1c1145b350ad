use chrono::Utc;
use sea_orm::{ entity::prelude::*, ActiveValue, DatabaseConnection };
use uuid::Uuid;

use crate::db::entity::price_alert;
use crate::error::Result;

/// Target prices declared by users. This is the engine-side mirror of the
/// user-preference store; evaluation never mutates rows.
pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: String,
        product_id: i32,
        target_price: Decimal
    ) -> Result<price_alert::Model> {
        let now = Utc::now();

        let alert = price_alert::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(user_id),
            product_id: ActiveValue::Set(product_id),
            target_price: ActiveValue::Set(target_price),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let alert = alert.insert(&self.db).await?;
        Ok(alert)
    }

    pub async fn find_active_for_user(&self, user_id: &str) -> Result<Vec<price_alert::Model>> {
        let alerts = price_alert::Entity
            ::find()
            .filter(price_alert::Column::UserId.eq(user_id))
            .filter(price_alert::Column::Active.eq(true))
            .all(&self.db).await?;

        Ok(alerts)
    }

    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<u64> {
        let result = price_alert::Entity
            ::delete_many()
            .filter(price_alert::Column::Id.eq(id))
            .filter(price_alert::Column::UserId.eq(user_id))
            .exec(&self.db).await?;

        Ok(result.rows_affected)
    }
}
