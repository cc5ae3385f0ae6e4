//! Kartpicker Core - catalog records, compatibility checks and performance
//! estimates for go-kart builds.
//!
//! Everything here is pure: no I/O, no clocks, no logging. The same inputs
//! always produce the same warnings and metrics.

pub mod catalog;
pub mod category;
pub mod compatibility;
pub mod cost;
pub mod error;
pub mod evaluate;
pub mod ev;
pub mod fitment;
pub mod performance;
pub mod rule;
pub mod spec;
pub mod validation;

// Re-exports for convenience
pub use catalog::{ElectricMotor, Engine, Part, PowerSource, ShaftType, Specifications};
pub use category::{CategoryGroup, PartCategory};
pub use compatibility::{check_compatibility, SelectedParts, AXLE_DIAMETER_TOLERANCE};
pub use cost::{budget_status, cost_breakdown, total_cost, BudgetState, BudgetStatus, CostBreakdown};
pub use error::{CoreError, ValidationError};
pub use ev::{check_ev_compatibility, EvCheck, EvStatus};
pub use evaluate::{evaluate_rule, ENGINE_CATEGORY};
pub use fitment::{check_fitments, compatible_parts, EnginePartFitment, FitmentLevel};
pub use performance::{
    calculate_gear_ratio, calculate_performance, calculate_performance_with_base,
    PerformanceMetrics, DEFAULT_BASE_KART_WEIGHT,
};
pub use rule::{CompatibilityRule, CompatibilityWarning, Comparison, Operator, RuleCondition, Severity};
pub use validation::Validator;
