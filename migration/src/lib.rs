//! Baseline database migrations for the simulation store.
//!
//! These migrations establish the schema as originally shipped. Structural
//! changes made after that point are applied by the drift migrator in the
//! main crate, which probes the live catalog instead of this ledger.

pub use sea_orm_migration::prelude::*;

mod m2024_03_01_000001_create_tenants;
mod m2024_03_01_000100_create_users;
mod m2024_03_01_000200_create_tenant_configs;
mod m2024_03_01_000300_create_scenarios;
mod m2024_03_01_000400_create_telemetry_tables;
mod m2024_03_01_000500_create_carla_metadata;
mod m2024_03_01_000600_create_logs_and_reports;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_03_01_000001_create_tenants::Migration),
            Box::new(m2024_03_01_000100_create_users::Migration),
            Box::new(m2024_03_01_000200_create_tenant_configs::Migration),
            Box::new(m2024_03_01_000300_create_scenarios::Migration),
            Box::new(m2024_03_01_000400_create_telemetry_tables::Migration),
            Box::new(m2024_03_01_000500_create_carla_metadata::Migration),
            Box::new(m2024_03_01_000600_create_logs_and_reports::Migration),
        ]
    }
}
