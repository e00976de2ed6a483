//! Migration to create the tenant_configs table.
//!
//! Configuration is versioned per tenant. Two constraints carry the
//! invariants: a unique key over (tenant_id, version) so version numbers
//! never collide, and a partial unique index over (tenant_id) filtered to
//! is_active so at most one version can be active at a time. A losing
//! concurrent activation fails on one of these at commit and retries.
//!
//! The split app_config/sim_config columns are intentionally absent here;
//! they were introduced after this schema shipped and are added by the
//! drift migrator.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantConfigs::TenantId).uuid().not_null())
                    .col(ColumnDef::new(TenantConfigs::Version).integer().not_null())
                    .col(
                        ColumnDef::new(TenantConfigs::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TenantConfigs::Config)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenantConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tenant_configs_tenant_id")
                            .from(TenantConfigs::Table, TenantConfigs::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenant_configs_tenant_version")
                    .table(TenantConfigs::Table)
                    .col(TenantConfigs::TenantId)
                    .col(TenantConfigs::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one active config per tenant.
        let backend = manager.get_database_backend();
        match backend {
            DatabaseBackend::Postgres => {
                manager
                    .get_connection()
                    .execute(Statement::from_string(
                        backend,
                        "DO $$\nBEGIN\n    IF NOT EXISTS (\n        SELECT 1 FROM pg_indexes\n        WHERE schemaname = current_schema()\n          AND indexname = 'idx_tenant_configs_one_active'\n    ) THEN\n        CREATE UNIQUE INDEX idx_tenant_configs_one_active\n            ON tenant_configs (tenant_id)\n            WHERE is_active;\n    END IF;\nEND\n$$;"
                            .to_string(),
                    ))
                    .await
                    .map(|_| ())
            }
            _ => manager
                .get_connection()
                .execute(Statement::from_string(
                    backend,
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_tenant_configs_one_active \
                     ON tenant_configs (tenant_id) \
                     WHERE is_active"
                        .to_string(),
                ))
                .await
                .map(|_| ()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS idx_tenant_configs_one_active",
            ))
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tenant_configs_tenant_version")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TenantConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantConfigs {
    Table,
    Id,
    TenantId,
    Version,
    IsActive,
    Config,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
