//! Create `files` table: one row per uploaded object, FK to `products`.
//! Only the public URL is stored; the bytes live in object storage.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(pk_auto(Files::Id))
                    .col(integer(Files::ProductId).not_null())
                    .col(text(Files::Location).not_null())
                    .col(string_len(Files::Name, 255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_files_product")
                            .from(Files::Table, Files::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Files::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Files { Table, Id, ProductId, Location, Name }

#[derive(DeriveIden)]
enum Products { Table, Id }
