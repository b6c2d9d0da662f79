//! Fixture file loading.
//!
//! Fixtures are JSON arrays, one file per entity, with a filename suffix
//! identifying the target backend (`owners.mongo.json` vs `owners.pg.json`).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::{Car, Owner, Ownership};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which backend a fixture file targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureVariant {
    Mongo,
    Postgres,
}

impl FixtureVariant {
    /// Filename suffix for this variant.
    pub fn suffix(&self) -> &'static str {
        match self {
            FixtureVariant::Mongo => "mongo",
            FixtureVariant::Postgres => "pg",
        }
    }

    /// Fixture filename for the given entity, e.g. `ownerships.pg.json`.
    pub fn file_name(&self, entity: &str) -> String {
        format!("{entity}.{}.json", self.suffix())
    }
}

/// The three entity lists loaded from a fixture directory.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    pub owners: Vec<Owner>,
    pub cars: Vec<Car>,
    pub ownerships: Vec<Ownership>,
}

impl FixtureSet {
    /// Loads the three fixture files for `variant` from `dir`.
    ///
    /// A missing file or malformed JSON is fatal.
    pub fn load(dir: &Path, variant: FixtureVariant) -> Result<Self, FixtureError> {
        Ok(Self {
            owners: load_entities(dir, "owners", variant)?,
            cars: load_entities(dir, "cars", variant)?,
            ownerships: load_entities(dir, "ownerships", variant)?,
        })
    }

    /// Surfaces suspicious fixture data without failing the run.
    ///
    /// Ownership references are not validated by the document backend and
    /// date ordering is not validated by either backend, so problems here
    /// are warnings only. Returns the number of warnings emitted.
    pub fn lint(&self) -> usize {
        let owner_ids: HashSet<i32> = self.owners.iter().map(|o| o.id).collect();
        let car_ids: HashSet<i32> = self.cars.iter().map(|c| c.id).collect();

        let mut warnings = 0;
        for ownership in &self.ownerships {
            if !owner_ids.contains(&ownership.owner_id) {
                warn!(
                    "ownership {} references unknown owner {}",
                    ownership.id, ownership.owner_id
                );
                warnings += 1;
            }
            if !car_ids.contains(&ownership.car_id) {
                warn!(
                    "ownership {} references unknown car {}",
                    ownership.id, ownership.car_id
                );
                warnings += 1;
            }
            if let Some(end) = ownership.end_date {
                if end < ownership.start_date {
                    warn!(
                        "ownership {} ends before it starts ({} < {})",
                        ownership.id, end, ownership.start_date
                    );
                    warnings += 1;
                }
            }
        }
        warnings
    }
}

/// Reads and parses one fixture file as a JSON array of `T`.
fn load_entities<T: DeserializeOwned>(
    dir: &Path,
    entity: &str,
    variant: FixtureVariant,
) -> Result<Vec<T>, FixtureError> {
    let path = dir.join(variant.file_name(entity));
    let contents = fs::read_to_string(&path).map_err(|source| FixtureError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| FixtureError::Parse { path, source })
}

pub(crate) mod de {
    //! Serde helpers matching the original fixture formats: ids may be JSON
    //! numbers or numeric strings, dates may be calendar dates or RFC 3339
    //! timestamps.

    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{Date, OffsetDateTime};

    pub fn entity_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(id),
            Raw::Text(s) => s
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid entity id: {s:?}"))),
        }
    }

    /// Parses either an RFC 3339 timestamp or a `YYYY-MM-DD` calendar date
    /// (taken as midnight UTC).
    pub(crate) fn parse_date_time(raw: &str) -> Result<OffsetDateTime, String> {
        if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Ok(parsed);
        }
        let format = format_description!("[year]-[month]-[day]");
        Date::parse(raw, &format)
            .map(|date| date.midnight().assume_utc())
            .map_err(|_| format!("invalid date: {raw:?}"))
    }

    pub fn date_time<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date_time(&raw).map_err(D::Error::custom)
    }

    pub fn optional_date_time<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_date_time(&raw).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seed-data-test-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_fixtures(dir: &Path, variant: FixtureVariant, ownerships: &str) {
        fs::write(
            dir.join(variant.file_name("owners")),
            r#"[{"id": "1", "name": "Alice", "email": "a@x.com"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join(variant.file_name("cars")),
            r#"[{"id": 1, "manufacturer": "TOYOTA", "type": "SEDAN"}]"#,
        )
        .unwrap();
        fs::write(dir.join(variant.file_name("ownerships")), ownerships).unwrap();
    }

    #[test]
    fn test_variant_file_names() {
        assert_eq!(FixtureVariant::Mongo.file_name("owners"), "owners.mongo.json");
        assert_eq!(FixtureVariant::Postgres.file_name("cars"), "cars.pg.json");
    }

    #[test]
    fn test_load_fixture_set() {
        let dir = fixture_dir("load");
        write_fixtures(
            &dir,
            FixtureVariant::Mongo,
            r#"[{"id": "1", "startDate": "2023-01-01", "endDate": null, "ownerId": "1", "carId": "1"}]"#,
        );

        let fixtures = FixtureSet::load(&dir, FixtureVariant::Mongo).unwrap();
        assert_eq!(fixtures.owners.len(), 1);
        assert_eq!(fixtures.owners[0].id, 1);
        assert_eq!(fixtures.cars.len(), 1);
        assert_eq!(fixtures.ownerships.len(), 1);
        assert_eq!(fixtures.ownerships[0].end_date, None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = fixture_dir("missing");
        let result = FixtureSet::load(&dir, FixtureVariant::Postgres);
        assert!(matches!(result, Err(FixtureError::Read { .. })));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let dir = fixture_dir("malformed");
        write_fixtures(&dir, FixtureVariant::Postgres, "[{not json");
        let result = FixtureSet::load(&dir, FixtureVariant::Postgres);
        match result {
            Err(FixtureError::Parse { path, .. }) => {
                assert!(path.ends_with("ownerships.pg.json"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_end_date_is_none() {
        let dir = fixture_dir("absent-end");
        write_fixtures(
            &dir,
            FixtureVariant::Mongo,
            r#"[{"id": 1, "startDate": "2023-01-01T08:30:00Z", "ownerId": 1, "carId": 1}]"#,
        );

        let fixtures = FixtureSet::load(&dir, FixtureVariant::Mongo).unwrap();
        let ownership = &fixtures.ownerships[0];
        assert_eq!(ownership.start_date, datetime!(2023-01-01 08:30 UTC));
        assert_eq!(ownership.end_date, None);
    }

    #[test]
    fn test_lint_clean_set() {
        let dir = fixture_dir("lint-clean");
        write_fixtures(
            &dir,
            FixtureVariant::Mongo,
            r#"[{"id": 1, "startDate": "2023-01-01", "endDate": "2024-01-01", "ownerId": 1, "carId": 1}]"#,
        );

        let fixtures = FixtureSet::load(&dir, FixtureVariant::Mongo).unwrap();
        assert_eq!(fixtures.lint(), 0);
    }

    #[test]
    fn test_lint_flags_dangling_references_and_inverted_dates() {
        let dir = fixture_dir("lint-dirty");
        write_fixtures(
            &dir,
            FixtureVariant::Mongo,
            r#"[{"id": 1, "startDate": "2024-01-01", "endDate": "2023-01-01", "ownerId": 7, "carId": 9}]"#,
        );

        let fixtures = FixtureSet::load(&dir, FixtureVariant::Mongo).unwrap();
        // Unknown owner, unknown car, end before start.
        assert_eq!(fixtures.lint(), 3);
    }

    #[test]
    fn test_parse_date_time_forms() {
        assert_eq!(
            de::parse_date_time("2023-06-15").unwrap(),
            datetime!(2023-06-15 00:00 UTC)
        );
        assert_eq!(
            de::parse_date_time("2023-06-15T12:00:00+02:00").unwrap(),
            datetime!(2023-06-15 10:00 UTC)
        );
        assert!(de::parse_date_time("June 15th").is_err());
    }
}
