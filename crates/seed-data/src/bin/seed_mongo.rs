//! Seeds the MongoDB backend from JSON fixtures.
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed-mongo
//! ```

use seed_data::config::MongoConfig;
use seed_data::db::{self, MongoSeeder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MongoConfig::from_env();
    tracing::info!("Starting MongoDB seeding into '{}'", config.database);

    let seeder = MongoSeeder::connect(&config).await?;

    // The connection is closed on every exit path before the result is
    // inspected.
    let result = db::seed(&seeder, &config.fixture_dir).await;
    seeder.close().await;
    let summary = result?;

    tracing::info!("MongoDB seeding completed");
    tracing::info!("  Owners: {}", summary.owners);
    tracing::info!("  Cars: {}", summary.cars);
    tracing::info!("  Ownerships: {}", summary.ownerships);

    Ok(())
}
