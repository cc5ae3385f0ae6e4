use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kartpicker_core::{
    BudgetStatus, CompatibilityRule, CompatibilityWarning, CostBreakdown, ElectricMotor, Engine,
    EnginePartFitment, EvCheck, FitmentLevel, Part, PartCategory, PerformanceMetrics,
    RuleCondition, Severity, ShaftType, Specifications,
};

// ============================================================================
// Database rows
// ============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EngineRow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub displacement_cc: f64,
    pub horsepower: f64,
    pub torque: f64,
    pub shaft_diameter: f64,
    pub shaft_length: f64,
    pub shaft_type: String,
    pub weight_lbs: Option<f64>,
    pub price: Option<f64>,
}

impl From<EngineRow> for Engine {
    fn from(row: EngineRow) -> Self {
        Engine {
            id: row.id,
            name: row.name,
            brand: row.brand,
            displacement_cc: row.displacement_cc,
            horsepower: row.horsepower,
            torque: row.torque,
            shaft_diameter: row.shaft_diameter,
            shaft_length: row.shaft_length,
            shaft_type: ShaftType::parse(&row.shaft_type).unwrap_or_default(),
            weight_lbs: row.weight_lbs,
            price: row.price,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MotorRow {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub voltage: f64,
    pub power_kw: f64,
    pub peak_power_kw: Option<f64>,
    pub horsepower: f64,
    pub torque_lbft: f64,
    pub shaft_diameter: Option<f64>,
    pub weight_lbs: Option<f64>,
    pub price: Option<f64>,
}

impl From<MotorRow> for ElectricMotor {
    fn from(row: MotorRow) -> Self {
        ElectricMotor {
            id: row.id,
            name: row.name,
            brand: row.brand,
            voltage: row.voltage,
            power_kw: row.power_kw,
            peak_power_kw: row.peak_power_kw,
            horsepower: row.horsepower,
            torque_lbft: row.torque_lbft,
            shaft_diameter: row.shaft_diameter,
            weight_lbs: row.weight_lbs,
            price: row.price,
        }
    }
}

/// Specifications are stored as a JSON object in a TEXT column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub specifications: Option<String>,
    pub price: Option<f64>,
}

impl From<PartRow> for Part {
    fn from(row: PartRow) -> Self {
        Part {
            id: row.id,
            name: row.name,
            category: PartCategory::parse(&row.category).unwrap_or(PartCategory::Unknown),
            brand: row.brand,
            specifications: row
                .specifications
                .as_deref()
                .and_then(|s| serde_json::from_str::<Specifications>(s).ok()),
            price: row.price,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RuleRow {
    pub id: String,
    pub rule_type: String,
    pub source_category: String,
    pub target_category: String,
    pub condition: String,
    pub warning_message: String,
    pub severity: String,
    pub is_active: bool,
}

impl From<RuleRow> for CompatibilityRule {
    fn from(row: RuleRow) -> Self {
        CompatibilityRule {
            id: row.id,
            rule_type: row.rule_type,
            source_category: row.source_category,
            target_category: row.target_category,
            condition: serde_json::from_str::<RuleCondition>(&row.condition).unwrap_or_default(),
            warning_message: row.warning_message,
            severity: Severity::parse(&row.severity).unwrap_or_default(),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FitmentRow {
    pub engine_id: String,
    pub part_id: String,
    pub level: String,
    pub notes: Option<String>,
}

impl FitmentRow {
    /// `None` for levels this build does not know.
    pub fn into_fitment(self) -> Option<EnginePartFitment> {
        Some(EnginePartFitment {
            level: FitmentLevel::parse(&self.level)?,
            engine_id: self.engine_id,
            part_id: self.part_id,
            notes: self.notes,
        })
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// Query parameters for the parts endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PartsQuery {
    pub category: Option<String>,
}

/// Query parameters for the rules endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RulesQuery {
    pub source_category: Option<String>,
    pub target_category: Option<String>,
    pub active: Option<bool>,
}

// ============================================================================
// Build requests
// ============================================================================

/// One part id or several for a category slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PartSelection {
    One(String),
    Many(Vec<String>),
}

impl PartSelection {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            PartSelection::One(id) => vec![id.as_str()],
            PartSelection::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Request body for compatibility checks.
#[derive(Debug, Deserialize)]
pub struct CompatibilityRequest {
    pub engine_id: Option<String>,
    pub motor_id: Option<String>,
    #[serde(default)]
    pub parts: BTreeMap<String, PartSelection>,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityResponse {
    pub warnings: Vec<CompatibilityWarning>,
}

/// Request body for performance estimates.
#[derive(Debug, Deserialize)]
pub struct PerformanceRequest {
    pub engine_id: Option<String>,
    #[serde(default)]
    pub part_ids: Vec<String>,
}

/// Request body for a full build summary.
#[derive(Debug, Deserialize)]
pub struct BuildSummaryRequest {
    pub engine_id: Option<String>,
    pub motor_id: Option<String>,
    #[serde(default)]
    pub parts: BTreeMap<String, PartSelection>,
    pub budget: Option<f64>,
}

/// Everything known about a build at one point in time.
#[derive(Debug, Serialize)]
pub struct BuildSummaryResponse {
    pub power_source: Option<String>,
    pub warnings: Vec<CompatibilityWarning>,
    pub ev_checks: Vec<EvCheck>,
    pub performance: PerformanceMetrics,
    pub total_cost: f64,
    pub cost_breakdown: Vec<CostBreakdown>,
    pub budget: Option<BudgetStatus>,
    pub evaluated_at: String,
}
