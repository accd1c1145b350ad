use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(PriceObservations::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(PriceObservations::Id)
                        .big_integer()
                        .not_null()
                        .auto_increment()
                        .primary_key()
                )
                .col(ColumnDef::new(PriceObservations::ProductId).integer().not_null())
                .col(ColumnDef::new(PriceObservations::StoreId).integer().not_null())
                .col(ColumnDef::new(PriceObservations::Price).decimal().not_null())
                .col(ColumnDef::new(PriceObservations::Currency).string_len(3).not_null())
                .col(
                    ColumnDef::new(PriceObservations::ObservedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(
                    ColumnDef::new(PriceObservations::IsSale)
                        .boolean()
                        .not_null()
                        .default(false)
                )
                .col(ColumnDef::new(PriceObservations::SaleEnd).timestamp_with_time_zone())
                .to_owned()
        ).await?;

        // The log is always scanned by product and time window
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_price_observations_product_observed_at")
                .table(PriceObservations::Table)
                .col(PriceObservations::ProductId)
                .col(PriceObservations::ObservedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_price_observations_observed_at")
                .table(PriceObservations::Table)
                .col(PriceObservations::ObservedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PriceObservations::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum PriceObservations {
    Table,
    Id,
    ProductId,
    StoreId,
    Price,
    Currency,
    ObservedAt,
    IsSale,
    SaleEnd,
}
