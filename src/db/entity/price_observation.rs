use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// One observed price for a (product, store) pair at a point in time.
/// Append-only: rows are never updated or deleted; a correction is a new
/// observation with a later `observed_at`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_observations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i32,
    pub store_id: i32,
    pub price: Decimal,
    pub currency: String,
    pub observed_at: DateTimeUtc,
    pub is_sale: bool,
    pub sale_end: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
