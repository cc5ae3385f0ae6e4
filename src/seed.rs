//! JSON catalog import.
//!
//! A seed document looks like `{engines, motors, parts, rules, fitments}`,
//! each an array of records. Records are decoded and validated one at a
//! time so a single bad entry does not block the rest of the catalog.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use kartpicker_core::{
    CompatibilityRule, CoreError, ElectricMotor, Engine, EnginePartFitment, Part, ValidationError,
    Validator,
};

use crate::db;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed is not a valid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Database error during seed: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub engines: Vec<Value>,
    #[serde(default)]
    pub motors: Vec<Value>,
    #[serde(default)]
    pub parts: Vec<Value>,
    #[serde(default)]
    pub rules: Vec<Value>,
    #[serde(default)]
    pub fitments: Vec<Value>,
}

/// Counts of imported records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub engines: usize,
    pub motors: usize,
    pub parts: usize,
    pub rules: usize,
    pub fitments: usize,
    pub skipped: usize,
}

/// Give records without an id a fresh one.
fn ensure_id(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        let missing = match map.get("id") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
    }
    value
}

fn decode<T: DeserializeOwned>(
    value: Value,
    validate: fn(&T) -> Result<(), ValidationError>,
) -> Result<T, CoreError> {
    let record: T = serde_json::from_value(value)?;
    validate(&record)?;
    Ok(record)
}

/// Decode every record of one kind, logging and counting the ones skipped.
fn decode_all<T: DeserializeOwned>(
    kind: &'static str,
    values: Vec<Value>,
    with_id: bool,
    validate: fn(&T) -> Result<(), ValidationError>,
    skipped: &mut usize,
) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let value = if with_id { ensure_id(value) } else { value };
            match decode(value, validate) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping {} #{}: {}", kind, index, e);
                    *skipped += 1;
                    None
                }
            }
        })
        .collect()
}

/// Import a parsed seed in one transaction.
pub async fn import(pool: &SqlitePool, seed: CatalogSeed) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let engines: Vec<Engine> = decode_all(
        "engine",
        seed.engines,
        true,
        Validator::validate_engine,
        &mut report.skipped,
    );
    let motors: Vec<ElectricMotor> = decode_all(
        "motor",
        seed.motors,
        true,
        Validator::validate_motor,
        &mut report.skipped,
    );
    let parts: Vec<Part> = decode_all(
        "part",
        seed.parts,
        true,
        Validator::validate_part,
        &mut report.skipped,
    );
    let rules: Vec<CompatibilityRule> = decode_all(
        "rule",
        seed.rules,
        true,
        Validator::validate_rule,
        &mut report.skipped,
    );
    let fitments: Vec<EnginePartFitment> = decode_all(
        "fitment",
        seed.fitments,
        false,
        Validator::validate_fitment,
        &mut report.skipped,
    );

    let mut tx = pool.begin().await?;

    for engine in &engines {
        db::upsert_engine(&mut *tx, engine).await?;
    }
    for motor in &motors {
        db::upsert_motor(&mut *tx, motor).await?;
    }
    for part in &parts {
        db::upsert_part(&mut *tx, part).await?;
    }
    for rule in &rules {
        db::upsert_rule(&mut *tx, rule).await?;
    }
    for fitment in &fitments {
        db::upsert_fitment(&mut *tx, fitment).await?;
    }

    tx.commit().await?;

    report.engines = engines.len();
    report.motors = motors.len();
    report.parts = parts.len();
    report.rules = rules.len();
    report.fitments = fitments.len();
    Ok(report)
}

/// Parse a seed document from a JSON string and import it.
pub async fn import_str(pool: &SqlitePool, json: &str) -> Result<SeedReport, SeedError> {
    let seed: CatalogSeed = serde_json::from_str(json)?;
    import(pool, seed).await
}

/// Read a seed file from disk and import it.
pub async fn import_file(pool: &SqlitePool, path: &Path) -> Result<SeedReport, SeedError> {
    let content = tokio::fs::read_to_string(path).await?;
    import_str(pool, &content).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_pool, run_migrations};
    use kartpicker_core::PartCategory;

    async fn setup_test_db() -> SqlitePool {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    const SEED: &str = r##"{
        "engines": [
            {"id": "predator-212", "name": "Predator 212", "brand": "Predator",
             "displacement_cc": 212, "horsepower": 6.5, "torque": 8.1,
             "shaft_diameter": 0.75, "shaft_length": 2.43, "shaft_type": "straight",
             "weight_lbs": 37, "price": 149.99},
            {"id": "broken", "name": "No Power"}
        ],
        "motors": [
            {"name": "QS 3kW", "brand": "QS", "voltage": 48, "power_kw": 3, "horsepower": 4}
        ],
        "parts": [
            {"id": "clutch-34", "name": "3/4 Clutch", "category": "clutch",
             "specifications": {"bore_diameter": 0.75, "chain_size": "#35"}, "price": 39.99},
            {"id": "odd", "name": "Odd Part", "category": "hovercraft"}
        ],
        "rules": [
            {"id": "r1", "source_category": "chain", "target_category": "sprocket",
             "condition": {"source_key": "pitch", "target_key": "pitch"},
             "warning_message": "Pitch mismatch"},
            {"id": "r2", "source_category": "chain", "target_category": "sprocket",
             "condition": {}, "warning_message": "Empty"}
        ],
        "fitments": [
            {"engine_id": "predator-212", "part_id": "clutch-34", "level": "direct_fit"},
            {"engine_id": "predator-212", "part_id": "clutch-34", "level": "sort_of"}
        ]
    }"##;

    #[test]
    fn test_ensure_id() {
        let filled = ensure_id(serde_json::json!({"name": "x"}));
        assert!(Uuid::parse_str(filled["id"].as_str().unwrap()).is_ok());

        let blank = ensure_id(serde_json::json!({"id": " ", "name": "x"}));
        assert_ne!(blank["id"], " ");

        let kept = ensure_id(serde_json::json!({"id": "e1"}));
        assert_eq!(kept["id"], "e1");
    }

    #[tokio::test]
    async fn test_import_skips_invalid_records() {
        let pool = setup_test_db().await;

        let report = import_str(&pool, SEED).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                engines: 1,
                motors: 1,
                parts: 1,
                rules: 1,
                fitments: 1,
                skipped: 4,
            }
        );

        let motors = db::list_motors(&pool).await.unwrap();
        assert_eq!(motors.len(), 1);
        assert!(Uuid::parse_str(&motors[0].id).is_ok());

        let parts = db::list_parts(&pool, Some(PartCategory::Clutch)).await.unwrap();
        assert_eq!(parts[0].id, "clutch-34");
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let pool = setup_test_db().await;

        import_str(&pool, SEED).await.unwrap();
        import_str(&pool, SEED).await.unwrap();

        assert_eq!(db::list_engines(&pool).await.unwrap().len(), 1);
        assert_eq!(db::list_parts(&pool, None).await.unwrap().len(), 1);
        assert_eq!(db::list_fitments(&pool, "predator-212").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let pool = setup_test_db().await;
        assert!(matches!(
            import_str(&pool, "[1, 2, 3]").await,
            Err(SeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let pool = setup_test_db().await;
        assert!(matches!(
            import_file(&pool, Path::new("/nonexistent/catalog.json")).await,
            Err(SeedError::Io(_))
        ));
    }
}
