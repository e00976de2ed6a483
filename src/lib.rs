//! # Simstore Library
//!
//! This library provides the persistence layer for the CARLA simulation
//! monitoring service: tenant-scoped configuration with versioned
//! activation, append-only scenario telemetry, the simulator metadata
//! catalog, and the drift migrator that converges live databases onto
//! the expected schema.

pub mod bootstrap;
pub mod config;
pub mod config_split;
pub mod db;
pub mod drift;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod seeds;
pub use migration;
