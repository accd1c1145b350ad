use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Catalog product. Owned by the external catalog service; the engine only
/// reads it to validate ids and resolve names/categories.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[sea_orm(unique)]
    pub barcode: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
