use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Engine, Part, PowerSource};
use crate::category::PartCategory;
use crate::rule::{CompatibilityRule, CompatibilityWarning};
use crate::spec::{self, display_value, format_number, get_spec, is_truthy, loosely_equal};

/// Allowed difference between a brake's axle bore and the axle diameter, in inches.
pub const AXLE_DIAMETER_TOLERANCE: f64 = 0.01;

/// Parts selected for a build, keyed by category.
///
/// A category may hold several parts (front/rear tire variants and the like);
/// the checks only look at the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PartCategory, OneOrMany>")]
pub struct SelectedParts(BTreeMap<PartCategory, Vec<Part>>);

/// Wire shape of a single category entry: one part or a list of parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Part),
    Many(Vec<Part>),
}

impl From<BTreeMap<PartCategory, OneOrMany>> for SelectedParts {
    fn from(map: BTreeMap<PartCategory, OneOrMany>) -> Self {
        let inner = map
            .into_iter()
            .map(|(category, entry)| match entry {
                OneOrMany::One(part) => (category, vec![part]),
                OneOrMany::Many(parts) => (category, parts),
            })
            .collect();
        Self(inner)
    }
}

impl SelectedParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group parts by their own category, preserving input order within a category.
    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        let mut selected = Self::new();
        for part in parts {
            selected.add(part);
        }
        selected
    }

    /// Append a part under its own category.
    pub fn add(&mut self, part: Part) {
        self.0.entry(part.category).or_default().push(part);
    }

    /// Replace whatever is selected for `category`.
    pub fn set(&mut self, category: PartCategory, parts: Vec<Part>) {
        self.0.insert(category, parts);
    }

    /// The first part in a category. Empty lists count as "not selected".
    pub fn first(&self, category: PartCategory) -> Option<&Part> {
        self.0.get(&category).and_then(|parts| parts.first())
    }

    pub fn contains(&self, category: PartCategory) -> bool {
        self.first(category).is_some()
    }

    /// All selected parts, flattened in category order.
    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.0.values().flatten()
    }

    /// One part per category: the single-part view the checks reason about.
    pub fn normalized(&self) -> BTreeMap<PartCategory, &Part> {
        self.0
            .iter()
            .filter_map(|(category, parts)| parts.first().map(|p| (*category, p)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check the selected parts against each other, the power source and the
/// active data-driven rules.
///
/// Pure and total: missing specifications mean "no constraint", unknown
/// categories are ignored.
pub fn check_compatibility(
    power_source: Option<&PowerSource>,
    parts: &SelectedParts,
    rules: &[CompatibilityRule],
) -> Vec<CompatibilityWarning> {
    let mut warnings = Vec::new();
    let engine = power_source.and_then(PowerSource::as_engine);

    if let Some(engine) = engine {
        check_shaft(engine, parts, &mut warnings);
    }
    check_chain_pitch(parts, &mut warnings);
    check_brake_axle(parts, &mut warnings);
    check_tire_wheel(parts, &mut warnings);
    check_bolt_pattern(parts, &mut warnings);

    let clutch = parts.contains(PartCategory::Clutch);
    let converter = parts.contains(PartCategory::TorqueConverter);

    if engine.is_some() && !clutch && !converter {
        warnings.push(CompatibilityWarning::info(
            "Engine",
            "Drive System",
            "Consider adding a clutch or torque converter for power transfer",
        ));
    }

    if clutch && converter {
        warnings.push(CompatibilityWarning::warning(
            "Clutch",
            "Torque Converter",
            "You have both a clutch and torque converter selected. Usually only one is needed.",
        ));
    }

    for rule in rules.iter().filter(|r| r.is_active) {
        if let Some(warning) = evaluate_spec_rule(rule, parts) {
            warnings.push(warning);
        }
    }

    warnings
}

/// Engine output shaft against the clutch or torque converter bore.
fn check_shaft(engine: &Engine, parts: &SelectedParts, warnings: &mut Vec<CompatibilityWarning>) {
    let driven = [
        (PartCategory::Clutch, "clutch"),
        (PartCategory::TorqueConverter, "torque converter"),
    ];

    for (category, noun) in driven {
        let Some(part) = parts.first(category) else {
            continue;
        };
        let Some(raw) = get_spec(part, "bore_diameter").filter(|v| is_truthy(v)) else {
            continue;
        };
        // A bore that is set but not a number can never equal the shaft.
        let bore = match spec::bore_inches(part) {
            Some(bore) if bore == engine.shaft_diameter => continue,
            Some(bore) => format_number(bore),
            None => display_value(raw),
        };
        warnings.push(CompatibilityWarning::error(
            "Engine",
            category.label(),
            format!(
                "Shaft diameter mismatch: Engine has {}\" shaft, but {} bore is {}\"",
                format_number(engine.shaft_diameter),
                noun,
                bore
            ),
        ));
    }
}

fn check_chain_pitch(parts: &SelectedParts, warnings: &mut Vec<CompatibilityWarning>) {
    let (Some(chain), Some(sprocket)) = (
        parts.first(PartCategory::Chain),
        parts.first(PartCategory::Sprocket),
    ) else {
        return;
    };

    if let Some((chain_pitch, sprocket_pitch)) =
        truthy_pair(get_spec(chain, "pitch"), get_spec(sprocket, "pitch"))
    {
        if !loosely_equal(chain_pitch, sprocket_pitch) {
            warnings.push(CompatibilityWarning::error(
                "Chain",
                "Sprocket",
                format!(
                    "Chain pitch mismatch: Chain is {} pitch, but sprocket is {} pitch",
                    display_value(chain_pitch),
                    display_value(sprocket_pitch)
                ),
            ));
        }
    }
}

fn check_brake_axle(parts: &SelectedParts, warnings: &mut Vec<CompatibilityWarning>) {
    let (Some(brake), Some(axle)) = (
        parts.first(PartCategory::Brake),
        parts.first(PartCategory::Axle),
    ) else {
        return;
    };

    let Some((brake_bore, axle_diameter)) =
        truthy_pair(get_spec(brake, "axle_diameter"), get_spec(axle, "diameter"))
    else {
        return;
    };

    if let (Some(b), Some(a)) = (spec::as_number(brake_bore), spec::as_number(axle_diameter)) {
        if (b - a).abs() > AXLE_DIAMETER_TOLERANCE {
            warnings.push(CompatibilityWarning::error(
                "Brake",
                "Axle",
                format!(
                    "Axle diameter mismatch: Brake requires {}\" axle, but selected axle is {}\"",
                    format_number(b),
                    format_number(a)
                ),
            ));
        }
    }
}

fn check_tire_wheel(parts: &SelectedParts, warnings: &mut Vec<CompatibilityWarning>) {
    let tire = parts
        .first(PartCategory::Tire)
        .or_else(|| parts.first(PartCategory::TireFront))
        .or_else(|| parts.first(PartCategory::TireRear));

    let (Some(tire), Some(wheel)) = (tire, parts.first(PartCategory::Wheel)) else {
        return;
    };

    if let Some((tire_diameter, wheel_diameter)) =
        truthy_pair(get_spec(tire, "wheel_diameter"), get_spec(wheel, "diameter"))
    {
        if !loosely_equal(tire_diameter, wheel_diameter) {
            warnings.push(CompatibilityWarning::error(
                "Tire",
                "Wheel",
                format!(
                    "Size mismatch: Tire is for {}\" wheels, but wheel diameter is {}\"",
                    display_value(tire_diameter),
                    display_value(wheel_diameter)
                ),
            ));
        }
    }
}

fn check_bolt_pattern(parts: &SelectedParts, warnings: &mut Vec<CompatibilityWarning>) {
    let (Some(wheel), Some(axle)) = (
        parts.first(PartCategory::Wheel),
        parts.first(PartCategory::Axle),
    ) else {
        return;
    };

    if let Some((wheel_pattern, axle_pattern)) = truthy_pair(
        get_spec(wheel, "bolt_pattern"),
        get_spec(axle, "bolt_pattern"),
    ) {
        if !loosely_equal(wheel_pattern, axle_pattern) {
            warnings.push(CompatibilityWarning::error(
                "Wheel",
                "Axle",
                format!(
                    "Bolt pattern mismatch: Wheel has {} pattern, but axle hub is {}",
                    display_value(wheel_pattern),
                    display_value(axle_pattern)
                ),
            ));
        }
    }
}

/// Spec-key rule: compare two aliased keys on the first parts of the rule's categories.
///
/// Values are compared loosely on purpose, so `"48"` matches `48`.
fn evaluate_spec_rule(
    rule: &CompatibilityRule,
    parts: &SelectedParts,
) -> Option<CompatibilityWarning> {
    let source = parts.first(PartCategory::parse(&rule.source_category)?)?;
    let target = parts.first(PartCategory::parse(&rule.target_category)?)?;
    let (source_key, target_key, should_match) = rule.condition.spec_key_check()?;

    let (source_value, target_value) =
        truthy_pair(get_spec(source, source_key), get_spec(target, target_key))?;

    let matches = loosely_equal(source_value, target_value);
    if matches == should_match {
        return None;
    }

    Some(CompatibilityWarning::warning(
        rule.source_category.clone(),
        rule.target_category.clone(),
        rule.warning_message.clone(),
    ))
}

fn truthy_pair<'a>(a: Option<&'a Value>, b: Option<&'a Value>) -> Option<(&'a Value, &'a Value)> {
    match (a, b) {
        (Some(a), Some(b)) if is_truthy(a) && is_truthy(b) => Some((a, b)),
        _ => None,
    }
}
