//! Database integration for seeding fixture data.
//!
//! Both backends implement [`SeedTarget`]; the [`seed`] driver runs the
//! shared connect-independent sequence: reset schema, load fixtures, insert.

mod mongo;
mod postgres;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::fixtures::{FixtureError, FixtureSet, FixtureVariant};

pub use mongo::MongoSeeder;
pub use postgres::PostgresSeeder;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Record counts from a completed seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub owners: usize,
    pub cars: usize,
    pub ownerships: usize,
}

/// A database backend that can be reset and bulk-loaded with fixture data.
#[async_trait]
pub trait SeedTarget {
    /// Which fixture file variant this backend consumes.
    fn variant(&self) -> FixtureVariant;

    /// Drops existing collections/tables and recreates schema and indexes.
    async fn reset_schema(&self) -> Result<(), SeedError>;

    /// Performs one bulk insert per entity, in dependency order
    /// (owners, cars, ownerships).
    async fn insert_all(&self, fixtures: &FixtureSet) -> Result<SeedSummary, SeedError>;
}

/// Runs a full seeding pass against `target`.
///
/// The sequence is destructive and not transactional: a failure after
/// `reset_schema` leaves the database partially seeded.
pub async fn seed(target: &impl SeedTarget, fixture_dir: &Path) -> Result<SeedSummary, SeedError> {
    target.reset_schema().await?;

    let fixtures = FixtureSet::load(fixture_dir, target.variant())?;
    let warnings = fixtures.lint();
    if warnings > 0 {
        info!("Proceeding despite {warnings} fixture warning(s)");
    }

    target.insert_all(&fixtures).await
}
