//! Migration to create the app_logs and simulation_reports tables.
//!
//! Both are append-only and tenant-scoped. Deleting a tenant nulls the
//! reference instead of cascading, so operational history survives tenant
//! removal.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppLogs::TenantId).uuid().null())
                    .col(ColumnDef::new(AppLogs::Level).text().not_null())
                    .col(ColumnDef::new(AppLogs::Message).text().not_null())
                    .col(ColumnDef::new(AppLogs::Extra).json_binary().null())
                    .col(
                        ColumnDef::new(AppLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_logs_tenant_id")
                            .from(AppLogs::Table, AppLogs::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_app_logs_tenant_id")
                    .table(AppLogs::Table)
                    .col(AppLogs::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SimulationReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimulationReports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SimulationReports::TenantId).uuid().null())
                    .col(ColumnDef::new(SimulationReports::Name).text().not_null())
                    .col(ColumnDef::new(SimulationReports::Html).text().not_null())
                    .col(
                        ColumnDef::new(SimulationReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_simulation_reports_tenant_id")
                            .from(SimulationReports::Table, SimulationReports::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimulationReports::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_app_logs_tenant_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AppLogs {
    Table,
    Id,
    TenantId,
    Level,
    Message,
    Extra,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SimulationReports {
    Table,
    Id,
    TenantId,
    Name,
    Html,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
