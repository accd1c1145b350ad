use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Products::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key()
                )
                .col(ColumnDef::new(Products::Name).string().not_null())
                .col(ColumnDef::new(Products::Brand).string())
                .col(ColumnDef::new(Products::Category).string())
                .col(ColumnDef::new(Products::Barcode).string().unique_key())
                .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_products_category")
                .table(Products::Table)
                .col(Products::Category)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_products_name")
                .table(Products::Table)
                .col(Products::Name)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Brand,
    Category,
    Barcode,
    CreatedAt,
}
