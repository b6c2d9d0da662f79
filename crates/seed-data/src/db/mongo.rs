//! MongoDB seeding backend.
//!
//! Collections are optimized for timestamp-range queries: every record is
//! stamped with `createdAt`/`updatedAt` at insert time and both fields get
//! ascending indexes.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, DateTime, Document};
use mongodb::error::ErrorKind;
use mongodb::{Client, Database, IndexModel};
use time::OffsetDateTime;
use tracing::info;

use crate::config::MongoConfig;
use crate::db::{SeedError, SeedSummary, SeedTarget};
use crate::fixtures::{FixtureSet, FixtureVariant};
use crate::models::{Car, Owner, Ownership};

const COLLECTIONS: [&str; 3] = ["owners", "cars", "ownerships"];

/// Seeder for the document store.
pub struct MongoSeeder {
    client: Client,
    db: Database,
}

impl MongoSeeder {
    /// Connects and verifies the server is reachable.
    pub async fn connect(config: &MongoConfig) -> Result<Self, SeedError> {
        let client = Client::with_uri_str(&config.url).await?;
        let db = client.database(&config.database);

        // The driver connects lazily; ping so an unreachable server fails
        // the run up front.
        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB");

        Ok(Self { client, db })
    }

    /// Shuts the client down. Always called, success or failure.
    pub async fn close(self) {
        let Self { client, db } = self;
        drop(db);
        client.shutdown().await;
        info!("MongoDB connection closed");
    }

    /// Drops the three collections, skipping any that do not exist.
    async fn drop_collections(&self) -> Result<(), SeedError> {
        for name in COLLECTIONS {
            match self.db.collection::<Document>(name).drop().await {
                Ok(()) => info!("Dropped collection: {name}"),
                Err(err) if is_namespace_not_found(&err) => {
                    info!("Collection {name} doesn't exist, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Creates ascending `createdAt`/`updatedAt` indexes on each collection.
    /// Re-running is idempotent at the database level.
    async fn create_indexes(&self) -> Result<(), SeedError> {
        for name in COLLECTIONS {
            let collection = self.db.collection::<Document>(name);
            collection
                .create_index(IndexModel::builder().keys(doc! { "createdAt": 1 }).build())
                .await?;
            collection
                .create_index(IndexModel::builder().keys(doc! { "updatedAt": 1 }).build())
                .await?;
        }
        info!("Created indexes");
        Ok(())
    }

    async fn insert_documents(&self, name: &str, documents: Vec<Document>) -> Result<(), SeedError> {
        if documents.is_empty() {
            info!("No {name} to insert");
            return Ok(());
        }
        let count = documents.len();
        self.db
            .collection::<Document>(name)
            .insert_many(documents)
            .await?;
        info!("Inserted {count} {name}");
        Ok(())
    }
}

#[async_trait]
impl SeedTarget for MongoSeeder {
    fn variant(&self) -> FixtureVariant {
        FixtureVariant::Mongo
    }

    async fn reset_schema(&self) -> Result<(), SeedError> {
        self.drop_collections().await?;
        self.create_indexes().await
    }

    async fn insert_all(&self, fixtures: &FixtureSet) -> Result<SeedSummary, SeedError> {
        let now = DateTime::now();

        let owners: Vec<Document> = fixtures
            .owners
            .iter()
            .map(|owner| owner_document(owner, now))
            .collect();
        self.insert_documents("owners", owners).await?;

        let cars: Vec<Document> = fixtures
            .cars
            .iter()
            .map(|car| car_document(car, now))
            .collect();
        self.insert_documents("cars", cars).await?;

        let ownerships: Vec<Document> = fixtures
            .ownerships
            .iter()
            .map(|ownership| ownership_document(ownership, now))
            .collect();
        self.insert_documents("ownerships", ownerships).await?;

        Ok(SeedSummary {
            owners: fixtures.owners.len(),
            cars: fixtures.cars.len(),
            ownerships: fixtures.ownerships.len(),
        })
    }
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    // Server error code 26: NamespaceNotFound.
    matches!(*err.kind, ErrorKind::Command(ref command) if command.code == 26)
}

fn bson_date(value: OffsetDateTime) -> DateTime {
    DateTime::from_millis((value.unix_timestamp_nanos() / 1_000_000) as i64)
}

fn owner_document(owner: &Owner, now: DateTime) -> Document {
    doc! {
        "id": owner.id,
        "name": owner.name.as_str(),
        "email": owner.email.as_str(),
        "createdAt": now,
        "updatedAt": now,
    }
}

fn car_document(car: &Car, now: DateTime) -> Document {
    doc! {
        "id": car.id,
        "manufacturer": car.manufacturer.as_str(),
        "type": car.kind.as_str(),
        "createdAt": now,
        "updatedAt": now,
    }
}

fn ownership_document(ownership: &Ownership, now: DateTime) -> Document {
    doc! {
        "id": ownership.id,
        "startDate": bson_date(ownership.start_date),
        "endDate": ownership
            .end_date
            .map_or(Bson::Null, |end| Bson::DateTime(bson_date(end))),
        "ownerId": ownership.owner_id,
        "carId": ownership.car_id,
        "createdAt": now,
        "updatedAt": now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarManufacturer, CarType};
    use time::macros::datetime;

    #[test]
    fn test_owner_document_stamps_timestamps() {
        let owner = Owner {
            id: 1,
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        };
        let now = DateTime::now();
        let document = owner_document(&owner, now);

        assert_eq!(document.get_i32("id").unwrap(), 1);
        assert_eq!(document.get_str("name").unwrap(), "Alice");
        assert_eq!(document.get_datetime("createdAt").unwrap(), &now);
        assert_eq!(document.get_datetime("updatedAt").unwrap(), &now);
    }

    #[test]
    fn test_car_document_uses_wire_strings() {
        let car = Car {
            id: 2,
            manufacturer: CarManufacturer::MercedesBenz,
            kind: CarType::SportsCar,
        };
        let document = car_document(&car, DateTime::now());

        assert_eq!(document.get_str("manufacturer").unwrap(), "MERCEDES_BENZ");
        assert_eq!(document.get_str("type").unwrap(), "SPORTS_CAR");
    }

    #[test]
    fn test_ownership_document_missing_end_date_is_null() {
        let ownership = Ownership {
            id: 3,
            start_date: datetime!(2023-01-01 00:00 UTC),
            end_date: None,
            owner_id: 1,
            car_id: 2,
        };
        let document = ownership_document(&ownership, DateTime::now());

        assert_eq!(document.get("endDate"), Some(&Bson::Null));
        assert_eq!(
            document.get_datetime("startDate").unwrap().timestamp_millis(),
            datetime!(2023-01-01 00:00 UTC).unix_timestamp() * 1000
        );
    }

    #[test]
    fn test_ownership_document_present_end_date() {
        let ownership = Ownership {
            id: 3,
            start_date: datetime!(2023-01-01 00:00 UTC),
            end_date: Some(datetime!(2024-06-01 12:00 UTC)),
            owner_id: 1,
            car_id: 2,
        };
        let document = ownership_document(&ownership, DateTime::now());

        match document.get("endDate") {
            Some(Bson::DateTime(end)) => {
                assert_eq!(
                    end.timestamp_millis(),
                    datetime!(2024-06-01 12:00 UTC).unix_timestamp() * 1000
                );
            }
            other => panic!("expected BSON datetime, got {other:?}"),
        }
    }
}
