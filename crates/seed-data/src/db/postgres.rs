//! PostgreSQL seeding backend.
//!
//! Referential integrity lives in the schema: ownership rows carry foreign
//! keys to owners and cars, both cascading on delete. Creation and update
//! timestamps are column defaults, so inserts never stamp them client-side.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::config::PostgresConfig;
use crate::db::{SeedError, SeedSummary, SeedTarget};
use crate::fixtures::{FixtureSet, FixtureVariant};
use crate::models::{Car, Owner, Ownership};

/// Seeder for the relational store.
pub struct PostgresSeeder {
    pool: PgPool,
}

impl PostgresSeeder {
    /// Connects a pool to the configured database.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, SeedError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url())
            .await?;
        info!("Connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Closes the pool. Always called, success or failure.
    pub async fn close(self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }

    /// Drops the tables dependents-first, then recreates them
    /// dependencies-first.
    async fn create_tables(&self) -> Result<(), SeedError> {
        for table in ["ownerships", "cars", "owners"] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await?;
            info!("Dropped table if present: {table}");
        }

        sqlx::query(
            r#"
            CREATE TABLE owners (
                id SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE cars (
                id SERIAL PRIMARY KEY,
                manufacturer VARCHAR(255) NOT NULL,
                type VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE ownerships (
                id SERIAL PRIMARY KEY,
                "startDate" TIMESTAMPTZ NOT NULL,
                "endDate" TIMESTAMPTZ NULL,
                "ownerId" INTEGER REFERENCES owners (id) ON DELETE CASCADE,
                "carId" INTEGER REFERENCES cars (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Tables created");
        Ok(())
    }

    /// Bulk-inserts owners with their fixture-declared ids.
    async fn insert_owners(&self, owners: &[Owner]) -> Result<(), SeedError> {
        if owners.is_empty() {
            info!("No owners to insert");
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO owners (id, name, email) ");
        builder.push_values(owners, |mut row, owner| {
            row.push_bind(owner.id)
                .push_bind(&owner.name)
                .push_bind(&owner.email);
        });
        builder.build().execute(&self.pool).await?;

        info!("Inserted {} owners", owners.len());
        Ok(())
    }

    /// Bulk-inserts cars with their fixture-declared ids.
    async fn insert_cars(&self, cars: &[Car]) -> Result<(), SeedError> {
        if cars.is_empty() {
            info!("No cars to insert");
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO cars (id, manufacturer, type) ");
        builder.push_values(cars, |mut row, car| {
            row.push_bind(car.id)
                .push_bind(car.manufacturer.as_str())
                .push_bind(car.kind.as_str());
        });
        builder.build().execute(&self.pool).await?;

        info!("Inserted {} cars", cars.len());
        Ok(())
    }

    /// Bulk-inserts ownerships; absent end dates bind as NULL.
    async fn insert_ownerships(&self, ownerships: &[Ownership]) -> Result<(), SeedError> {
        if ownerships.is_empty() {
            info!("No ownerships to insert");
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"INSERT INTO ownerships (id, "startDate", "endDate", "ownerId", "carId") "#,
        );
        builder.push_values(ownerships, |mut row, ownership| {
            row.push_bind(ownership.id)
                .push_bind(ownership.start_date)
                .push_bind(ownership.end_date)
                .push_bind(ownership.owner_id)
                .push_bind(ownership.car_id);
        });
        builder.build().execute(&self.pool).await?;

        info!("Inserted {} ownerships", ownerships.len());
        Ok(())
    }
}

#[async_trait]
impl SeedTarget for PostgresSeeder {
    fn variant(&self) -> FixtureVariant {
        FixtureVariant::Postgres
    }

    async fn reset_schema(&self) -> Result<(), SeedError> {
        self.create_tables().await
    }

    async fn insert_all(&self, fixtures: &FixtureSet) -> Result<SeedSummary, SeedError> {
        // Dependency order: ownerships reference both other tables.
        self.insert_owners(&fixtures.owners).await?;
        self.insert_cars(&fixtures.cars).await?;
        self.insert_ownerships(&fixtures.ownerships).await?;

        Ok(SeedSummary {
            owners: fixtures.owners.len(),
            cars: fixtures.cars.len(),
            ownerships: fixtures.ownerships.len(),
        })
    }
}
