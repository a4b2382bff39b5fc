//! DSL validation error types.

use thiserror::Error;

/// A semantic rule that a structurally valid document broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("worker name must be 63 characters or less (got {0})")]
    WorkerNameTooLong(usize),

    #[error("worker compatibility_date must be in YYYY-MM-DD format (got {0:?})")]
    CompatibilityDate(String),

    #[error("invalid hostname format: {0:?}")]
    Hostname(String),

    #[error("invalid zone_name format: {0:?}")]
    ZoneName(String),

    /// Two bindings of one kind map to the same Terraform resource name.
    #[error("duplicate {kind} binding {name:?} (binding names are case-insensitive)")]
    DuplicateBinding { kind: &'static str, name: String },
}

/// Errors produced while validating a DSL document.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// First JSON Schema violation found.
    #[error("schema violation at {path}: {message}")]
    Schema { path: String, message: String },

    /// The document passed the schema but could not be read into the typed model.
    #[error("document shape error: {0}")]
    Shape(String),

    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("invalid DSL schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;
