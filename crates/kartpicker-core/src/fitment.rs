use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Engine, Part};
use crate::evaluate::{evaluate_rule, ENGINE_CATEGORY};
use crate::rule::{CompatibilityRule, CompatibilityWarning, Severity};

/// How well a specific part fits a specific engine, as curated by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitmentLevel {
    DirectFit,
    RequiresModification,
    AdapterRequired,
}

impl FitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitmentLevel::DirectFit => "direct_fit",
            FitmentLevel::RequiresModification => "requires_modification",
            FitmentLevel::AdapterRequired => "adapter_required",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct_fit" => Some(FitmentLevel::DirectFit),
            "requires_modification" => Some(FitmentLevel::RequiresModification),
            "adapter_required" => Some(FitmentLevel::AdapterRequired),
            _ => None,
        }
    }
}

/// Explicit engine/part mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnginePartFitment {
    pub engine_id: String,
    pub part_id: String,
    pub level: FitmentLevel,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Warnings for selected parts that only fit with extra work.
///
/// Mappings for other engines or unselected parts are ignored.
pub fn check_fitments(
    engine: &Engine,
    parts: &[Part],
    fitments: &[EnginePartFitment],
) -> Vec<CompatibilityWarning> {
    fitments
        .iter()
        .filter(|f| f.engine_id == engine.id)
        .filter_map(|fitment| {
            let target = parts
                .iter()
                .find(|p| p.id == fitment.part_id)?
                .name
                .clone();
            let (severity, default_message) = match fitment.level {
                FitmentLevel::DirectFit => return None,
                FitmentLevel::RequiresModification => (
                    Severity::Warning,
                    "This part requires modification to fit this engine",
                ),
                FitmentLevel::AdapterRequired => (
                    Severity::Info,
                    "An adapter is required to use this part with this engine",
                ),
            };
            let message = fitment
                .notes
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_message.to_string());
            Some(CompatibilityWarning::new(
                severity,
                engine.name.clone(),
                target,
                message,
            ))
        })
        .collect()
}

/// Filter candidate parts down to those usable with `engine`.
///
/// A `direct_fit` mapping always keeps the part. Otherwise the part is dropped
/// when any active engine-sourced rule targeting its category fails with
/// severity `error`.
pub fn compatible_parts<'a>(
    engine: &Engine,
    candidates: &'a [Part],
    rules: &[CompatibilityRule],
    fitments: &[EnginePartFitment],
) -> Vec<&'a Part> {
    let direct_fit: HashSet<&str> = fitments
        .iter()
        .filter(|f| f.engine_id == engine.id && f.level == FitmentLevel::DirectFit)
        .map(|f| f.part_id.as_str())
        .collect();

    let engine_rules: Vec<&CompatibilityRule> = rules
        .iter()
        .filter(|r| r.is_active && r.source_category == ENGINE_CATEGORY)
        .collect();

    candidates
        .iter()
        .filter(|part| {
            if direct_fit.contains(part.id.as_str()) {
                return true;
            }
            !engine_rules
                .iter()
                .filter(|r| r.target_category == part.category.as_str())
                .any(|rule| {
                    evaluate_rule(rule, Some(engine), std::slice::from_ref(*part))
                        .is_some_and(|w| w.is_error())
                })
        })
        .collect()
}
