pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_stores_table;
mod m20250601_000002_create_products_table;
mod m20250602_000001_create_price_observations_table;
mod m20250603_000001_create_price_alerts_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_stores_table::Migration),
            Box::new(m20250601_000002_create_products_table::Migration),
            Box::new(m20250602_000001_create_price_observations_table::Migration),
            Box::new(m20250603_000001_create_price_alerts_table::Migration)
        ]
    }
}
