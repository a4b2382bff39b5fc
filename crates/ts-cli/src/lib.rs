//! `ts` command-line front end.
//!
//! Wires configuration, the interpreter tiers, validation, rendering and the
//! Terraform executor into the `init`, `plan`, `dryrun`, `apply`,
//! `validate` and `doctor` commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod pipeline;

pub use config::{Config, ConfigError, ConfigResult};
pub use pipeline::{Pipeline, PreparedRun};
