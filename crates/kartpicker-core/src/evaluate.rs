//! Field-operator rules: `{compare, source_field, target_field}` conditions
//! evaluated against whole records rather than specification keys.

use serde_json::Value;

use crate::catalog::{Engine, Part};
use crate::rule::{CompatibilityRule, CompatibilityWarning, Operator};
use crate::spec::{as_number, display_value, loosely_equal};

/// Source category naming the selected engine instead of a part.
pub const ENGINE_CATEGORY: &str = "engine";

/// Evaluate one field-operator rule.
///
/// The source value comes from the engine when the rule's source category is
/// `engine`, otherwise from the first part of that category. Every part of the
/// target category is checked and the first failure is reported with the
/// rule's severity. Returns `None` when the rule passes or does not apply.
pub fn evaluate_rule(
    rule: &CompatibilityRule,
    engine: Option<&Engine>,
    parts: &[Part],
) -> Option<CompatibilityWarning> {
    let (op, source_field, target_field) = rule.condition.field_check()?;

    let (source_value, source_name) = match engine {
        Some(engine) if rule.source_category == ENGINE_CATEGORY => (
            serde_json::to_value(engine)
                .ok()
                .and_then(|v| lookup_path(&v, source_field).cloned()),
            engine.name.clone(),
        ),
        _ => match parts
            .iter()
            .find(|p| p.category.as_str() == rule.source_category)
        {
            Some(part) => (
                serde_json::to_value(part)
                    .ok()
                    .and_then(|v| lookup_path(&v, source_field).cloned()),
                part.name.clone(),
            ),
            None => (None, "Unknown".to_string()),
        },
    };

    parts
        .iter()
        .filter(|p| p.category.as_str() == rule.target_category)
        .find_map(|target| {
            let record = serde_json::to_value(target).ok()?;
            let target_value = lookup_path(&record, target_field);
            if compare_values(op, source_value.as_ref(), target_value) {
                None
            } else {
                Some(CompatibilityWarning::new(
                    rule.severity,
                    source_name.clone(),
                    target.name.clone(),
                    rule.warning_message.clone(),
                ))
            }
        })
}

/// Follow a dotted path (`specifications.bore_diameter`) into a JSON record.
pub fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Apply an operator. Missing values and unsupported operators pass.
pub fn compare_values(op: Operator, source: Option<&Value>, target: Option<&Value>) -> bool {
    let (Some(source), Some(target)) = (source, target) else {
        return true;
    };
    if source.is_null() || target.is_null() {
        return true;
    }

    let numeric = |f: fn(f64, f64) -> bool| match (as_number(source), as_number(target)) {
        (Some(s), Some(t)) => f(s, t),
        _ => false,
    };

    match op {
        Operator::Equal => loosely_equal(source, target),
        Operator::NotEqual => !loosely_equal(source, target),
        Operator::GreaterThan => numeric(|s, t| s > t),
        Operator::LessThan => numeric(|s, t| s < t),
        Operator::GreaterThanOrEqual => numeric(|s, t| s >= t),
        Operator::LessThanOrEqual => numeric(|s, t| s <= t),
        Operator::Contains => display_value(source).contains(&display_value(target)),
        Operator::Unsupported => true,
    }
}
