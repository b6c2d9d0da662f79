//! Fixture seeding for the car registry.
//!
//! This crate loads owners, cars, and ownership records from JSON fixture
//! files into two independent database targets: a MongoDB document store and
//! a PostgreSQL relational store. Each run is destructive (existing
//! collections/tables are dropped and recreated) and non-incremental.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let config = PostgresConfig::from_env();
//! let seeder = PostgresSeeder::connect(&config).await?;
//! let result = db::seed(&seeder, &config.fixture_dir).await;
//! seeder.close().await;
//! let summary = result?;
//! ```

pub mod config;
pub mod db;
pub mod fixtures;
pub mod models;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{MongoConfig, PostgresConfig};
    pub use crate::db::{seed, MongoSeeder, PostgresSeeder, SeedError, SeedSummary, SeedTarget};
    pub use crate::fixtures::{FixtureError, FixtureSet, FixtureVariant};
    pub use crate::models::{Car, CarManufacturer, CarType, Owner, Ownership};
}
