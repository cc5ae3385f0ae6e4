//! Specification lookup with key aliases and loose value semantics.
//!
//! Parts come from several ingestion paths, so the same logical attribute can
//! live under different keys (`bore_diameter` from the legacy editor,
//! `bore_in` from the CSV importer). Lookups resolve aliases in one place.

use serde_json::Value;

use crate::catalog::{Part, Specifications};

const MM_PER_INCH: f64 = 25.4;

/// Alias table. A key's aliases are tried in order after the key itself.
const SPEC_ALIASES: &[(&str, &[&str])] = &[
    ("bore_diameter", &["bore_in", "bore_mm"]),
    ("bore_in", &["bore_diameter"]),
    ("pitch", &["chain_size"]),
    ("chain_size", &["pitch"]),
];

fn aliases_of(key: &str) -> &'static [&'static str] {
    SPEC_ALIASES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Resolve `key` on a specification map, returning the key that matched.
pub fn resolve<'a>(specs: &'a Specifications, key: &str) -> Option<(&'a str, &'a Value)> {
    if let Some((k, v)) = specs.get_key_value(key) {
        return Some((k.as_str(), v));
    }
    aliases_of(key)
        .iter()
        .find_map(|alias| specs.get_key_value(*alias))
        .map(|(k, v)| (k.as_str(), v))
}

/// Look up a specification on a part, resolving aliases.
///
/// Returns `None` when the part has no specifications or neither the key nor
/// any alias is present. A present `null` is returned as-is.
pub fn get_spec<'a>(part: &'a Part, key: &str) -> Option<&'a Value> {
    let specs = part.specifications.as_ref()?;
    resolve(specs, key).map(|(_, v)| v)
}

/// Bore diameter in inches. `bore_mm` values are converted and rounded to
/// the thousandth so they compare equal to nominal inch sizes.
pub fn bore_inches(part: &Part) -> Option<f64> {
    let specs = part.specifications.as_ref()?;
    let (key, value) = resolve(specs, "bore_diameter")?;
    let bore = as_number(value)?;
    if key == "bore_mm" {
        Some((bore / MM_PER_INCH * 1000.0).round() / 1000.0)
    } else {
        Some(bore)
    }
}

/// First numeric value among `keys`, without alias resolution or coercion.
pub fn number_of(specs: &Specifications, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| specs.get(*k))
        .find_map(|v| v.as_f64().filter(|n| !n.is_nan()))
}

/// Truthiness in the sense catalog data is written with: null, false, zero,
/// NaN and the empty string are "not set".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric view of a value. Numeric strings (`"0.75"`) are coerced.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Equality across JSON representations: `1`, `1.0` and `"1"` are equal.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_), _) | (_, Value::Number(_)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => a == b,
    }
}

/// Render a value for a warning message: strings unquoted, integral numbers
/// without a trailing `.0`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub(crate) fn format_number(f: f64) -> String {
    format!("{}", f)
}
