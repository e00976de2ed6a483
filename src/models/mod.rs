//! # Data Models
//!
//! SeaORM entities for every table the store owns, plus the auth tables
//! the API layer reads. One module per table.

pub mod app_log;
pub mod carla_metadata;
pub mod scenario;
pub mod sensor_data;
pub mod simulation_metric;
pub mod simulation_report;
pub mod tenant;
pub mod tenant_config;
pub mod user;
pub mod user_session;
pub mod vehicle_data;

pub use carla_metadata::Entity as CarlaMetadata;
pub use scenario::Entity as Scenario;
pub use sensor_data::Entity as SensorData;
pub use simulation_metric::Entity as SimulationMetric;
pub use tenant::Entity as Tenant;
pub use tenant_config::Entity as TenantConfig;
pub use vehicle_data::Entity as VehicleData;
