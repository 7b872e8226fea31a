use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Products: listing is ordered by priority
        manager
            .create_index(
                Index::create()
                    .name("idx_products_priority")
                    .table(Products::Table)
                    .col(Products::Priority)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ProductDetails: children are loaded per product
        manager
            .create_index(
                Index::create()
                    .name("idx_product_details_product")
                    .table(ProductDetails::Table)
                    .col(ProductDetails::ProductId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Files: same access path as details
        manager
            .create_index(
                Index::create()
                    .name("idx_files_product")
                    .table(Files::Table)
                    .col(Files::ProductId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_files_product").table(Files::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_details_product").table(ProductDetails::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_products_priority").table(Products::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Products { Table, Priority }

#[derive(DeriveIden)]
enum ProductDetails { Table, ProductId }

#[derive(DeriveIden)]
enum Files { Table, ProductId }
