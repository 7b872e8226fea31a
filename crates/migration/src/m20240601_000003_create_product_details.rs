//! Create `product_details` table with FK to `products` (cascade on delete).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductDetails::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductDetails::Id))
                    .col(integer(ProductDetails::ProductId).not_null())
                    .col(string_len(ProductDetails::Label, 255).not_null())
                    .col(text(ProductDetails::Description).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_details_product")
                            .from(ProductDetails::Table, ProductDetails::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductDetails::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductDetails { Table, Id, ProductId, Label, Description }

#[derive(DeriveIden)]
enum Products { Table, Id }
