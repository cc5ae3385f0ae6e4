use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use std::str::FromStr;

use kartpicker_core::{
    CompatibilityRule, ElectricMotor, Engine, EnginePartFitment, Part, PartCategory,
};

use crate::models::{EngineRow, FitmentRow, MotorRow, PartRow, RuleRow, RulesQuery};

const ENGINE_COLUMNS: &str = "id, name, brand, displacement_cc, horsepower, torque, \
     shaft_diameter, shaft_length, shaft_type, weight_lbs, price";
const MOTOR_COLUMNS: &str = "id, name, brand, voltage, power_kw, peak_power_kw, horsepower, \
     torque_lbft, shaft_diameter, weight_lbs, price";
const PART_COLUMNS: &str = "id, name, category, brand, specifications, price";
const RULE_COLUMNS: &str = "id, rule_type, source_category, target_category, condition, \
     warning_message, severity, is_active";

/// Initialize database connection pool with recommended pragmas.
///
/// In-memory databases are per connection, so they get a single connection
/// that is never recycled.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    pool_options.connect_with(options).await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../migrations/001_create_catalog.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

/// Cheap round trip used by the readiness probe.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

// ============================================================================
// Writes (seed import)
// ============================================================================

pub async fn upsert_engine<'e>(
    db: impl SqliteExecutor<'e>,
    engine: &Engine,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO engines
            (id, name, brand, displacement_cc, horsepower, torque,
             shaft_diameter, shaft_length, shaft_type, weight_lbs, price)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&engine.id)
    .bind(&engine.name)
    .bind(&engine.brand)
    .bind(engine.displacement_cc)
    .bind(engine.horsepower)
    .bind(engine.torque)
    .bind(engine.shaft_diameter)
    .bind(engine.shaft_length)
    .bind(engine.shaft_type.as_str())
    .bind(engine.weight_lbs)
    .bind(engine.price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn upsert_motor<'e>(
    db: impl SqliteExecutor<'e>,
    motor: &ElectricMotor,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO electric_motors
            (id, name, brand, voltage, power_kw, peak_power_kw, horsepower,
             torque_lbft, shaft_diameter, weight_lbs, price)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&motor.id)
    .bind(&motor.name)
    .bind(&motor.brand)
    .bind(motor.voltage)
    .bind(motor.power_kw)
    .bind(motor.peak_power_kw)
    .bind(motor.horsepower)
    .bind(motor.torque_lbft)
    .bind(motor.shaft_diameter)
    .bind(motor.weight_lbs)
    .bind(motor.price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn upsert_part<'e>(
    db: impl SqliteExecutor<'e>,
    part: &Part,
) -> Result<(), sqlx::Error> {
    let specifications = part
        .specifications
        .as_ref()
        .map(|specs| serde_json::Value::Object(specs.clone()).to_string());

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO parts (id, name, category, brand, specifications, price)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&part.id)
    .bind(&part.name)
    .bind(part.category.as_str())
    .bind(&part.brand)
    .bind(specifications)
    .bind(part.price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn upsert_rule<'e>(
    db: impl SqliteExecutor<'e>,
    rule: &CompatibilityRule,
) -> Result<(), sqlx::Error> {
    let condition =
        serde_json::to_string(&rule.condition).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO compatibility_rules
            (id, rule_type, source_category, target_category, condition,
             warning_message, severity, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&rule.id)
    .bind(&rule.rule_type)
    .bind(&rule.source_category)
    .bind(&rule.target_category)
    .bind(condition)
    .bind(&rule.warning_message)
    .bind(rule.severity.as_str())
    .bind(rule.is_active)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn upsert_fitment<'e>(
    db: impl SqliteExecutor<'e>,
    fitment: &EnginePartFitment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO engine_part_fitments (engine_id, part_id, level, notes)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&fitment.engine_id)
    .bind(&fitment.part_id)
    .bind(fitment.level.as_str())
    .bind(&fitment.notes)
    .execute(db)
    .await?;
    Ok(())
}

// ============================================================================
// Reads
// ============================================================================

pub async fn list_engines(pool: &SqlitePool) -> Result<Vec<Engine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EngineRow>(&format!(
        "SELECT {ENGINE_COLUMNS} FROM engines ORDER BY brand, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_engine(pool: &SqlitePool, id: &str) -> Result<Option<Engine>, sqlx::Error> {
    let row = sqlx::query_as::<_, EngineRow>(&format!(
        "SELECT {ENGINE_COLUMNS} FROM engines WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn list_motors(pool: &SqlitePool) -> Result<Vec<ElectricMotor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MotorRow>(&format!(
        "SELECT {MOTOR_COLUMNS} FROM electric_motors ORDER BY brand, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_motor(pool: &SqlitePool, id: &str) -> Result<Option<ElectricMotor>, sqlx::Error> {
    let row = sqlx::query_as::<_, MotorRow>(&format!(
        "SELECT {MOTOR_COLUMNS} FROM electric_motors WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

/// All parts, or the parts of one category.
pub async fn list_parts(
    pool: &SqlitePool,
    category: Option<PartCategory>,
) -> Result<Vec<Part>, sqlx::Error> {
    let rows = match category {
        Some(category) => {
            sqlx::query_as::<_, PartRow>(&format!(
                "SELECT {PART_COLUMNS} FROM parts WHERE category = ? ORDER BY name"
            ))
            .bind(category.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PartRow>(&format!(
                "SELECT {PART_COLUMNS} FROM parts ORDER BY category, name"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Parts with the given ids. Unknown ids are simply absent from the result.
pub async fn get_parts(pool: &SqlitePool, ids: &[&str]) -> Result<Vec<Part>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {PART_COLUMNS} FROM parts WHERE id IN ("));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows = query.build_query_as::<PartRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn list_rules(
    pool: &SqlitePool,
    filter: &RulesQuery,
) -> Result<Vec<CompatibilityRule>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {RULE_COLUMNS} FROM compatibility_rules WHERE 1 = 1"));

    if let Some(source) = &filter.source_category {
        query.push(" AND source_category = ").push_bind(source);
    }
    if let Some(target) = &filter.target_category {
        query.push(" AND target_category = ").push_bind(target);
    }
    if let Some(active) = filter.active {
        query.push(" AND is_active = ").push_bind(active);
    }
    query.push(" ORDER BY id");

    let rows = query.build_query_as::<RuleRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Active rules, in a stable order.
pub async fn active_rules(pool: &SqlitePool) -> Result<Vec<CompatibilityRule>, sqlx::Error> {
    list_rules(
        pool,
        &RulesQuery {
            active: Some(true),
            ..RulesQuery::default()
        },
    )
    .await
}

pub async fn list_fitments(
    pool: &SqlitePool,
    engine_id: &str,
) -> Result<Vec<EnginePartFitment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FitmentRow>(
        "SELECT engine_id, part_id, level, notes FROM engine_part_fitments \
         WHERE engine_id = ? ORDER BY part_id",
    )
    .bind(engine_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(FitmentRow::into_fitment).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kartpicker_core::{
        Comparison, FitmentLevel, Operator, RuleCondition, Severity, ShaftType,
    };

    /// Create a test database with in-memory SQLite.
    async fn setup_test_db() -> SqlitePool {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn predator() -> Engine {
        Engine {
            id: "predator-212".to_string(),
            name: "Predator 212".to_string(),
            brand: "Predator".to_string(),
            displacement_cc: 212.0,
            horsepower: 6.5,
            torque: 8.1,
            shaft_diameter: 0.75,
            shaft_length: 2.43,
            shaft_type: ShaftType::Straight,
            weight_lbs: Some(37.0),
            price: Some(149.99),
        }
    }

    fn rule(id: &str, source: &str, target: &str, active: bool) -> CompatibilityRule {
        let mut rule = CompatibilityRule::new(
            source,
            target,
            RuleCondition::spec_keys("pitch", "pitch", Comparison::Equals),
            "Pitch mismatch",
        );
        rule.id = id.to_string();
        rule.is_active = active;
        rule
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = setup_test_db().await;
        run_migrations(&pool).await.unwrap();
        assert!(list_engines(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_engine_round_trip() {
        let pool = setup_test_db().await;
        upsert_engine(&pool, &predator()).await.unwrap();

        let engine = get_engine(&pool, "predator-212").await.unwrap().unwrap();
        assert_eq!(engine, predator());
        assert!(get_engine(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let pool = setup_test_db().await;
        upsert_engine(&pool, &predator()).await.unwrap();

        let mut tuned = predator();
        tuned.horsepower = 9.0;
        upsert_engine(&pool, &tuned).await.unwrap();

        let engines = list_engines(&pool).await.unwrap();
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].horsepower, 9.0);
    }

    #[tokio::test]
    async fn test_parts_by_category_and_ids() {
        let pool = setup_test_db().await;
        let clutch = Part::new("c1", PartCategory::Clutch)
            .with_name("Max-Torque Clutch")
            .with_spec("bore_diameter", 0.75)
            .with_spec("pitch", "#35")
            .with_price(39.99);
        let chain = Part::new("ch1", PartCategory::Chain).with_spec("pitch", "#35");
        upsert_part(&pool, &clutch).await.unwrap();
        upsert_part(&pool, &chain).await.unwrap();

        let clutches = list_parts(&pool, Some(PartCategory::Clutch)).await.unwrap();
        assert_eq!(clutches, vec![clutch.clone()]);
        assert_eq!(list_parts(&pool, None).await.unwrap().len(), 2);

        let found = get_parts(&pool, &["c1", "nope"]).await.unwrap();
        assert_eq!(found, vec![clutch]);
        assert!(get_parts(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_stored_category_reads_as_unknown() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO parts (id, name, category) VALUES ('x1', 'Mystery', 'hovercraft')")
            .execute(&pool)
            .await
            .unwrap();

        let parts = list_parts(&pool, None).await.unwrap();
        assert_eq!(parts[0].category, PartCategory::Unknown);
    }

    #[tokio::test]
    async fn test_rule_filters() {
        let pool = setup_test_db().await;
        upsert_rule(&pool, &rule("r1", "chain", "sprocket", true)).await.unwrap();
        upsert_rule(&pool, &rule("r2", "chain", "clutch", true)).await.unwrap();
        upsert_rule(&pool, &rule("r3", "chain", "sprocket", false)).await.unwrap();

        let mut field_rule = CompatibilityRule::new(
            "engine",
            "clutch",
            RuleCondition::fields(Operator::Equal, "shaft_diameter", "specifications.bore_diameter"),
            "Bore mismatch",
        )
        .with_severity(Severity::Error);
        field_rule.id = "r4".to_string();
        upsert_rule(&pool, &field_rule).await.unwrap();

        assert_eq!(list_rules(&pool, &RulesQuery::default()).await.unwrap().len(), 4);

        let filter = RulesQuery {
            source_category: Some("chain".to_string()),
            target_category: Some("sprocket".to_string()),
            active: None,
        };
        let ids: Vec<String> = list_rules(&pool, &filter)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["r1", "r3"]);

        let active = active_rules(&pool).await.unwrap();
        assert_eq!(active.len(), 3);

        let stored = active.into_iter().find(|r| r.id == "r4").unwrap();
        assert_eq!(stored, field_rule);
    }

    #[tokio::test]
    async fn test_fitments() {
        let pool = setup_test_db().await;
        let fitment = EnginePartFitment {
            engine_id: "predator-212".to_string(),
            part_id: "h1".to_string(),
            level: FitmentLevel::AdapterRequired,
            notes: Some("Needs a spacer".to_string()),
        };
        upsert_fitment(&pool, &fitment).await.unwrap();

        assert_eq!(list_fitments(&pool, "predator-212").await.unwrap(), vec![fitment]);
        assert!(list_fitments(&pool, "other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_db_check_constraints() {
        let pool = setup_test_db().await;

        let mut bad = predator();
        bad.horsepower = -1.0;
        assert!(upsert_engine(&pool, &bad).await.is_err());

        let result = sqlx::query(
            "INSERT INTO engine_part_fitments (engine_id, part_id, level) VALUES (?, ?, ?)",
        )
        .bind("e1")
        .bind("p1")
        .bind("bolt_on_ish")
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
