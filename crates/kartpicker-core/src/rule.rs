use serde::{Deserialize, Serialize};

/// Severity of a compatibility finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

/// A structured note about a potential or confirmed mismatch between two
/// selected components. Recomputed on every evaluation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityWarning {
    #[serde(rename = "type")]
    pub kind: Severity,
    pub source: String,
    pub target: String,
    pub message: String,
}

impl CompatibilityWarning {
    pub fn new(
        kind: Severity,
        source: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn error(
        source: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Error, source, target, message)
    }

    pub fn warning(
        source: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, source, target, message)
    }

    pub fn info(
        source: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Info, source, target, message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == Severity::Error
    }
}

/// Spec-key comparison mode. Anything other than `not_equals` means the two
/// values must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    NotEquals,
    #[default]
    #[serde(other)]
    Equals,
}

/// Field comparison operator used by admin-authored rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    /// Operators this build does not know. They never fail a check.
    #[serde(other)]
    Unsupported,
}

/// Rule condition. Two shapes exist in the catalog and both are optional:
///
/// - spec-key: `{source_key, target_key, comparison}`, compared on part
///   specifications with alias resolution;
/// - field-operator: `{compare, source_field, target_field}`, dotted paths
///   into the engine/part records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
}

impl RuleCondition {
    pub fn spec_keys(
        source_key: impl Into<String>,
        target_key: impl Into<String>,
        comparison: Comparison,
    ) -> Self {
        Self {
            source_key: Some(source_key.into()),
            target_key: Some(target_key.into()),
            comparison: Some(comparison),
            ..Self::default()
        }
    }

    pub fn fields(
        compare: Operator,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            compare: Some(compare),
            source_field: Some(source_field.into()),
            target_field: Some(target_field.into()),
            ..Self::default()
        }
    }

    /// The spec-key shape, if both keys are set and non-empty.
    pub fn spec_key_check(&self) -> Option<(&str, &str, bool)> {
        let source = self.source_key.as_deref().filter(|k| !k.is_empty())?;
        let target = self.target_key.as_deref().filter(|k| !k.is_empty())?;
        let should_match = self.comparison.unwrap_or_default() != Comparison::NotEquals;
        Some((source, target, should_match))
    }

    /// The field-operator shape, if all three members are set and non-empty.
    pub fn field_check(&self) -> Option<(Operator, &str, &str)> {
        let op = self.compare?;
        let source = self.source_field.as_deref().filter(|f| !f.is_empty())?;
        let target = self.target_field.as_deref().filter(|f| !f.is_empty())?;
        Some((op, source, target))
    }
}

/// A persisted, data-driven compatibility rule.
///
/// Categories are kept as strings: field-operator rules may name `engine` as
/// their source, which is not a part category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub rule_type: String,
    pub source_category: String,
    pub target_category: String,
    #[serde(default)]
    pub condition: RuleCondition,
    pub warning_message: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CompatibilityRule {
    pub fn new(
        source_category: impl Into<String>,
        target_category: impl Into<String>,
        condition: RuleCondition,
        warning_message: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            rule_type: String::new(),
            source_category: source_category.into(),
            target_category: target_category.into(),
            condition,
            warning_message: warning_message.into(),
            severity: Severity::Warning,
            is_active: true,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
