//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial data.
//! It includes seeding for the default tenant and the simulator metadata
//! catalog that need to be populated when the application starts.

pub mod tenant;

pub use tenant::seed_default_tenant;
