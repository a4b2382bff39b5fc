//! DSL validation: JSON Schema structure check followed by semantic rules.
//!
//! The schema catches missing or mistyped fields per intent; the semantic
//! rules cover what the schema does not express (worker name length,
//! compatibility date shape, unique binding names, hostname and zone
//! syntax). The first violation found aborts validation.

use std::collections::HashSet;
use std::ops::Deref;

use serde_json::Value;

use crate::document::{DslDocument, Operation};
use crate::domain::{MAX_WORKER_NAME_LEN, is_valid_date, is_valid_hostname, is_valid_zone};
use crate::error::{RuleViolation, ValidationError, ValidationResult};

/// The DSL JSON Schema, embedded at build time.
pub const SCHEMA_SOURCE: &str = include_str!("../schema/dsl.schema.json");

/// A document that passed validation. Read-only from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument(DslDocument);

impl ValidatedDocument {
    /// Zone name (always present after validation).
    pub fn zone_name(&self) -> &str {
        self.0.zone_name.as_deref().unwrap_or_default()
    }

    /// Hostname (always present after validation).
    pub fn hostname(&self) -> &str {
        self.0.hostname.as_deref().unwrap_or_default()
    }
}

impl Deref for ValidatedDocument {
    type Target = DslDocument;

    fn deref(&self) -> &DslDocument {
        &self.0
    }
}

/// Compiled DSL schema plus the semantic rule set.
pub struct Validator {
    schema: jsonschema::Validator,
}

impl Validator {
    /// Compile the embedded schema.
    pub fn new() -> ValidationResult<Self> {
        let schema: Value = serde_json::from_str(SCHEMA_SOURCE)
            .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;
        let schema = jsonschema::validator_for(&schema)
            .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;
        Ok(Self { schema })
    }

    /// Validate a typed document.
    pub fn validate(&self, doc: DslDocument) -> ValidationResult<ValidatedDocument> {
        self.check_schema(&doc.to_value())?;
        check_rules(&doc)?;
        Ok(ValidatedDocument(doc))
    }

    /// Validate a raw JSON document: schema first, then the typed model, then
    /// the semantic rules.
    pub fn validate_value(&self, value: &Value) -> ValidationResult<ValidatedDocument> {
        self.check_schema(value)?;
        let doc: DslDocument = serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::Shape(e.to_string()))?;
        check_rules(&doc)?;
        Ok(ValidatedDocument(doc))
    }

    fn check_schema(&self, value: &Value) -> ValidationResult<()> {
        match self.schema.iter_errors(value).next() {
            Some(err) => {
                let path = err.instance_path.to_string();
                Err(ValidationError::Schema {
                    path: if path.is_empty() { "/".into() } else { path },
                    message: err.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

/// Validate a typed document with a freshly loaded schema.
pub fn validate(doc: DslDocument) -> ValidationResult<ValidatedDocument> {
    Validator::new()?.validate(doc)
}

/// Validate a raw JSON document with a freshly loaded schema.
pub fn validate_value(value: &Value) -> ValidationResult<ValidatedDocument> {
    Validator::new()?.validate_value(value)
}

fn check_rules(doc: &DslDocument) -> Result<(), RuleViolation> {
    if let Operation::CreateWorkerAndBindDomain {
        worker, bindings, ..
    } = &doc.operation
    {
        let len = worker.name.chars().count();
        if len > MAX_WORKER_NAME_LEN {
            return Err(RuleViolation::WorkerNameTooLong(len));
        }
        if !is_valid_date(&worker.compatibility_date) {
            return Err(RuleViolation::CompatibilityDate(
                worker.compatibility_date.clone(),
            ));
        }
        if let Some(bindings) = bindings {
            check_unique("kv", &bindings.kv)?;
            check_unique("d1", &bindings.d1)?;
        }
    }

    if let Some(hostname) = &doc.hostname
        && !is_valid_hostname(hostname)
    {
        return Err(RuleViolation::Hostname(hostname.clone()));
    }

    if let Some(zone) = &doc.zone_name
        && !is_valid_zone(zone)
    {
        return Err(RuleViolation::ZoneName(zone.clone()));
    }

    Ok(())
}

/// Binding names become lowercase resource names, so they must not collide.
fn check_unique(kind: &'static str, names: &[String]) -> Result<(), RuleViolation> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(RuleViolation::DuplicateBinding {
                kind,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
