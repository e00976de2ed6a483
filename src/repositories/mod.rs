//! # Repositories
//!
//! Data access layer for the store: tenant provisioning, versioned tenant
//! configuration, scenario telemetry, the metadata catalog, and the
//! append-only logs/reports surface.

pub mod carla_metadata;
pub mod ops;
pub mod telemetry;
pub mod tenant;
pub mod tenant_config;

pub use carla_metadata::CarlaMetadataRepository;
pub use ops::OpsRepository;
pub use telemetry::TelemetryRepository;
pub use tenant::{CreateTenantRequest, TenantRepository};
pub use tenant_config::TenantConfigRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

    use crate::drift::DriftMigrator;

    /// Fresh in-memory SQLite database with the baseline migrations and
    /// the drift pass applied, foreign keys enforced.
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect to in-memory sqlite");

        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA foreign_keys = ON".to_string(),
        ))
        .await
        .expect("enable foreign keys");

        migration::Migrator::up(&db, None)
            .await
            .expect("apply baseline migrations");

        DriftMigrator::new(&db)
            .run()
            .await
            .expect("apply drift migrations");

        db
    }
}
