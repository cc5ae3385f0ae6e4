use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{0} id cannot be empty")]
    EmptyId(&'static str),

    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    #[error("Invalid {field} {value}: must be a finite number")]
    NotFinite { field: &'static str, value: f64 },

    #[error("Invalid {field} {value}: cannot be negative")]
    Negative { field: &'static str, value: f64 },

    #[error("Invalid {field} {value}: must be greater than zero")]
    NotPositive { field: &'static str, value: f64 },

    #[error("Part {0} has an unknown category")]
    UnknownCategory(String),

    #[error("Rule {0} is missing a source or target category")]
    EmptyCategory(String),

    #[error("Rule {0} has no warning message")]
    EmptyWarningMessage(String),

    #[error("Rule {0} condition has neither spec keys nor fields to compare")]
    EmptyCondition(String),
}
