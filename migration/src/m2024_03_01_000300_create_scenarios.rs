//! Migration to create the scenarios table.
//!
//! A scenario row represents one simulation run; telemetry tables hang off
//! scenario_id with cascade delete.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scenarios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scenarios::ScenarioId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scenarios::SessionId).text().not_null())
                    .col(ColumnDef::new(Scenarios::ScenarioName).text().not_null())
                    .col(
                        ColumnDef::new(Scenarios::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Scenarios::EndTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Scenarios::Status)
                            .text()
                            .not_null()
                            .default("running"),
                    )
                    .col(
                        ColumnDef::new(Scenarios::ScenarioMetadata)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Scenarios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scenarios_session_id")
                    .table(Scenarios::Table)
                    .col(Scenarios::SessionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_scenarios_session_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Scenarios::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Scenarios {
    Table,
    ScenarioId,
    SessionId,
    ScenarioName,
    StartTime,
    EndTime,
    Status,
    ScenarioMetadata,
    CreatedAt,
}
