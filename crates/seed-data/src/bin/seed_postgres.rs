//! Seeds the PostgreSQL backend from JSON fixtures.
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed-postgres
//! ```

use seed_data::config::PostgresConfig;
use seed_data::db::{self, PostgresSeeder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PostgresConfig::from_env();
    tracing::info!(
        "Starting PostgreSQL seeding into '{}' at {}:{}",
        config.database,
        config.host,
        config.port
    );

    let seeder = PostgresSeeder::connect(&config).await?;

    // The pool is released on every exit path before the result is
    // inspected.
    let result = db::seed(&seeder, &config.fixture_dir).await;
    seeder.close().await;
    let summary = result?;

    tracing::info!("PostgreSQL seeding completed");
    tracing::info!("  Owners: {}", summary.owners);
    tracing::info!("  Cars: {}", summary.cars);
    tracing::info!("  Ownerships: {}", summary.ownerships);

    Ok(())
}
