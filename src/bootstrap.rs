//! Startup sequencing for the store.
//!
//! Order matters: the ledgered baseline migrations run first and are
//! fatal on failure, then the drift pass converges whatever the baseline
//! does not cover, then seeds fill in the default tenant. Repositories
//! assume this sequence has completed before they are constructed.

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::drift::{DriftMigrator, DriftReport};
use crate::repositories::TenantRepository;
use crate::seeds::seed_default_tenant;

/// Bring a freshly connected database to a servable state.
pub async fn bootstrap(db: &DatabaseConnection, config: &AppConfig) -> Result<DriftReport> {
    Migrator::up(db, None)
        .await
        .context("baseline migrations failed")?;
    tracing::info!("baseline migrations applied");

    let report = DriftMigrator::new(db)
        .with_app_role(&config.app_role)
        .run()
        .await
        .context("drift pass failed")?;
    tracing::info!(applied = report.applied(), "drift pass finished");

    let tenants = TenantRepository::new(db);
    seed_default_tenant(
        &tenants,
        &config.default_tenant_name,
        &config.default_tenant_slug,
    )
    .await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, Statement};

    #[tokio::test]
    async fn test_bootstrap_runs_end_to_end_and_is_rerunnable() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA foreign_keys = ON".to_string(),
        ))
        .await
        .unwrap();

        let config = AppConfig::default();

        let first = bootstrap(&db, &config).await.unwrap();
        assert!(first.applied() > 0);

        let second = bootstrap(&db, &config).await.unwrap();
        assert_eq!(second.applied(), 0);

        let tenants = TenantRepository::new(&db);
        assert_eq!(tenants.get_tenant_count().await.unwrap(), 1);
    }
}
