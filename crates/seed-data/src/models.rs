//! Entity types shared by both seeding backends.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::fixtures::de;

/// A person who owns one or more cars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Owner {
    #[serde(deserialize_with = "de::entity_id")]
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A car in the registry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Car {
    #[serde(deserialize_with = "de::entity_id")]
    pub id: i32,
    pub manufacturer: CarManufacturer,
    #[serde(rename = "type")]
    pub kind: CarType,
}

/// The period during which an owner possessed a car.
///
/// An absent `end_date` means the ownership is ongoing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ownership {
    #[serde(deserialize_with = "de::entity_id")]
    pub id: i32,
    #[serde(rename = "startDate", deserialize_with = "de::date_time")]
    pub start_date: OffsetDateTime,
    #[serde(rename = "endDate", default, deserialize_with = "de::optional_date_time")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(rename = "ownerId", deserialize_with = "de::entity_id")]
    pub owner_id: i32,
    #[serde(rename = "carId", deserialize_with = "de::entity_id")]
    pub car_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarManufacturer {
    Toyota,
    Ford,
    Chevrolet,
    Bmw,
    MercedesBenz,
}

impl CarManufacturer {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarManufacturer::Toyota => "TOYOTA",
            CarManufacturer::Ford => "FORD",
            CarManufacturer::Chevrolet => "CHEVROLET",
            CarManufacturer::Bmw => "BMW",
            CarManufacturer::MercedesBenz => "MERCEDES_BENZ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarType {
    Sedan,
    Suv,
    Truck,
    Van,
    SportsCar,
    Electric,
    Hybrid,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Sedan => "SEDAN",
            CarType::Suv => "SUV",
            CarType::Truck => "TRUCK",
            CarType::Van => "VAN",
            CarType::SportsCar => "SPORTS_CAR",
            CarType::Electric => "ELECTRIC",
            CarType::Hybrid => "HYBRID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_manufacturer_wire_format() {
        let m: CarManufacturer = serde_json::from_str("\"MERCEDES_BENZ\"").unwrap();
        assert_eq!(m, CarManufacturer::MercedesBenz);
        assert_eq!(m.as_str(), "MERCEDES_BENZ");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"MERCEDES_BENZ\"");
    }

    #[test]
    fn test_car_type_wire_format() {
        let t: CarType = serde_json::from_str("\"SPORTS_CAR\"").unwrap();
        assert_eq!(t, CarType::SportsCar);
        assert_eq!(t.as_str(), "SPORTS_CAR");
    }

    #[test]
    fn test_unknown_manufacturer_rejected() {
        let result = serde_json::from_str::<CarManufacturer>("\"TESLA\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_car_uses_type_key() {
        let car: Car =
            serde_json::from_str(r#"{"id": 1, "manufacturer": "TOYOTA", "type": "SEDAN"}"#)
                .unwrap();
        assert_eq!(car.kind, CarType::Sedan);
    }

    #[test]
    fn test_ownership_dates() {
        let ownership: Ownership = serde_json::from_str(
            r#"{"id": "1", "startDate": "2023-01-01", "endDate": null, "ownerId": "1", "carId": "1"}"#,
        )
        .unwrap();
        assert_eq!(ownership.start_date, datetime!(2023-01-01 00:00 UTC));
        assert_eq!(ownership.end_date, None);
    }
}
