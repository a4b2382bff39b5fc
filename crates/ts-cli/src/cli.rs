//! Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ts - natural language to Terraform for Cloudflare.
#[derive(Debug, Parser)]
#[command(name = "ts", version, about)]
pub struct Cli {
    /// Config file (defaults to ~/.config/terrasmart/config.toml).
    #[arg(long, global = true, env = "TS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit diagnostic logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set up API keys and defaults.
    Init,

    /// Translate a request, render Terraform and run `terraform plan`.
    Plan {
        /// What to build, in plain language.
        prompt: String,
        /// Output directory for the generated files.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Translate and render only; Terraform is not run.
    Dryrun {
        prompt: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Apply a rendered run (the latest one by default).
    Apply {
        /// Skip confirmation and pass `-auto-approve`.
        #[arg(long)]
        approve: bool,
        /// Run directory to apply.
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Check a DSL JSON file against the schema and rules.
    Validate { file: PathBuf },

    /// Check Terraform, configuration and model connectivity.
    Doctor,
}
