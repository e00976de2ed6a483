//! Migration to create the carla_metadata table.
//!
//! A read-mostly catalog of simulator data (maps, blueprints, enumerations)
//! keyed by a version string. Refreshed wholesale by catalog sync.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CarlaMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CarlaMetadata::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CarlaMetadata::Version)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CarlaMetadata::Data)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CarlaMetadata::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CarlaMetadata::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CarlaMetadata::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CarlaMetadata {
    Table,
    Id,
    Version,
    Data,
    CreatedAt,
    UpdatedAt,
}
