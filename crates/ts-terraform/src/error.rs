//! Renderer and executor error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from writing a Terraform working directory.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(
        "Cloudflare account ID is required but not configured \
         (run `ts init` or set CLOUDFLARE_ACCOUNT_ID)"
    )]
    MissingAccountId,

    #[error("template error: {0}")]
    Template(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid run document {}: {message}", path.display())]
    RunDocument { path: PathBuf, message: String },
}

impl RenderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from running the Terraform binary.
#[derive(Debug, Error)]
pub enum TerraformError {
    #[error("working directory does not exist: {}", .0.display())]
    MissingWorkDir(PathBuf),

    #[error("Terraform not found in PATH, install it from https://terraform.io/downloads")]
    NotInstalled,

    #[error("terraform {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("terraform {command} failed (exit code {}){}", display_code(.code), display_output(.stderr, .stdout))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
        stdout: String,
    },

    #[error("failed to run terraform {command}: {message}")]
    Spawn { command: String, message: String },
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

fn display_output(stderr: &str, stdout: &str) -> String {
    let mut out = String::new();
    if !stderr.trim().is_empty() {
        out.push_str(":\n");
        out.push_str(stderr.trim_end());
    }
    if !stdout.trim().is_empty() {
        out.push_str("\nOutput:\n");
        out.push_str(stdout.trim_end());
    }
    out
}

/// Convenience alias for renderer results.
pub type RenderResult<T> = Result<T, RenderError>;

/// Convenience alias for executor results.
pub type TerraformResult<T> = Result<T, TerraformError>;
