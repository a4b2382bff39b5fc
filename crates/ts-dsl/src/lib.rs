//! TerraSmart DSL: the intermediate representation between operator text
//! and generated Terraform.
//!
//! Provides the document model (a tagged union keyed on `intent`), the
//! embedded JSON Schema, hostname/zone helpers shared by the interpreters and
//! the renderer, and the validator that turns a raw document into a
//! `ValidatedDocument`.

pub mod document;
pub mod domain;
pub mod error;
pub mod validate;

pub use document::{
    Bindings, DnsRecord, DnsRecordSelector, DnsRecordType, DslDocument, Intent, Operation,
    Routing, RoutingMode, WorkerSpec,
};
pub use error::{RuleViolation, ValidationError, ValidationResult};
pub use validate::{ValidatedDocument, Validator, validate, validate_value};
