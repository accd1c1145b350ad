use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// User-declared target price for a product. Supplied by the
/// user-preference surface; the engine evaluates targets against current
/// prices on every query and never mutates them during evaluation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub product_id: i32,
    pub target_price: Decimal,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
