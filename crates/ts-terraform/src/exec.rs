//! Terraform process executor.
//!
//! Runs `terraform` subcommands in a run directory:
//! - `init -upgrade`, `plan -detailed-exitcode`, `apply`, `destroy`
//! - 300-second timeout, child killed when it expires
//! - `CLOUDFLARE_API_TOKEN` injected from configuration when the
//!   environment does not already carry one
//! - Interactive apply/destroy (no `-auto-approve`) inherits the terminal
//!   and captures nothing

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::error::{TerraformError, TerraformResult};

/// Default per-command timeout.
pub const TERRAFORM_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for `terraform --version`.
const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

const TERRAFORM_BIN: &str = "terraform";

/// Environment variable the Cloudflare provider reads its token from.
pub const TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// `plan -detailed-exitcode` status meaning "succeeded, changes present".
const PLAN_CHANGES_EXIT: i32 = 2;

/// Runs Terraform commands in one working directory.
#[derive(Debug, Clone)]
pub struct TerraformExecutor {
    work_dir: PathBuf,
    binary: OsString,
    api_token: Option<String>,
    timeout: Duration,
}

impl TerraformExecutor {
    /// Executor for an existing directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> TerraformResult<Self> {
        let work_dir = work_dir.into();
        if !work_dir.is_dir() {
            return Err(TerraformError::MissingWorkDir(work_dir));
        }
        Ok(Self {
            work_dir,
            binary: TERRAFORM_BIN.into(),
            api_token: None,
            timeout: TERRAFORM_TIMEOUT,
        })
    }

    /// Token injected as `CLOUDFLARE_API_TOKEN` unless already set.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_binary(mut self, binary: impl Into<OsString>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn init(&self) -> TerraformResult<String> {
        self.run(&["init", "-upgrade"]).await
    }

    /// Plan output. Exit code 2 (changes present) counts as success.
    pub async fn plan(&self) -> TerraformResult<String> {
        self.run(&["plan", "-detailed-exitcode"]).await
    }

    /// Without `auto_approve` Terraform prompts on the user's terminal and
    /// the returned output is empty.
    pub async fn apply(&self, auto_approve: bool) -> TerraformResult<String> {
        if auto_approve {
            self.run(&["apply", "-auto-approve"]).await
        } else {
            self.run(&["apply"]).await
        }
    }

    pub async fn destroy(&self, auto_approve: bool) -> TerraformResult<String> {
        if auto_approve {
            self.run(&["destroy", "-auto-approve"]).await
        } else {
            self.run(&["destroy"]).await
        }
    }

    async fn run(&self, args: &[&str]) -> TerraformResult<String> {
        let subcommand = args.first().copied().unwrap_or_default().to_string();
        let interactive =
            matches!(subcommand.as_str(), "apply" | "destroy") && !args.contains(&"-auto-approve");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args).current_dir(&self.work_dir).kill_on_drop(true);
        if std::env::var_os(TOKEN_ENV).is_none()
            && let Some(token) = &self.api_token
        {
            cmd.env(TOKEN_ENV, token);
        }

        tracing::info!(
            command = %subcommand,
            dir = %self.work_dir.display(),
            interactive,
            "running terraform"
        );

        if interactive {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
            let status = self.with_timeout_of(&subcommand, cmd.status()).await?;
            if !status.success() {
                return Err(TerraformError::Failed {
                    command: subcommand,
                    code: status.code(),
                    stderr: String::new(),
                    stdout: String::new(),
                });
            }
            return Ok(String::new());
        }

        cmd.stdin(Stdio::null());
        let output = self.with_timeout_of(&subcommand, cmd.output()).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let code = output.status.code();
        let plan_with_changes = subcommand == "plan" && code == Some(PLAN_CHANGES_EXIT);
        if output.status.success() || plan_with_changes {
            tracing::debug!(command = %subcommand, ?code, "terraform finished");
            return Ok(stdout);
        }

        Err(TerraformError::Failed {
            command: subcommand,
            code,
            stderr,
            stdout,
        })
    }

    async fn with_timeout_of<T>(
        &self,
        subcommand: &str,
        fut: impl Future<Output = std::io::Result<T>>,
    ) -> TerraformResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(spawn_error(subcommand, e)),
            Err(_) => Err(TerraformError::Timeout {
                command: subcommand.to_string(),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn spawn_error(subcommand: &str, e: std::io::Error) -> TerraformError {
    if e.kind() == ErrorKind::NotFound {
        TerraformError::NotInstalled
    } else {
        TerraformError::Spawn {
            command: subcommand.to_string(),
            message: e.to_string(),
        }
    }
}

/// Installed Terraform version (`"1.6.0"`), from `terraform --version`.
pub async fn terraform_version() -> TerraformResult<String> {
    version_of(TERRAFORM_BIN).await
}

async fn version_of(binary: impl AsRef<std::ffi::OsStr>) -> TerraformResult<String> {
    let output = tokio::time::timeout(
        VERSION_TIMEOUT,
        Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| TerraformError::Timeout {
        command: "--version".into(),
        secs: VERSION_TIMEOUT.as_secs(),
    })?
    .map_err(|e| spawn_error("--version", e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(TerraformError::Failed {
            command: "--version".into(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            stdout: stdout.into_owned(),
        });
    }

    parse_version(&stdout).ok_or_else(|| TerraformError::Failed {
        command: "--version".into(),
        code: output.status.code(),
        stderr: "unrecognized version output".into(),
        stdout: stdout.into_owned(),
    })
}

/// Version from the first line of `terraform --version` output.
pub fn parse_version(output: &str) -> Option<String> {
    let first = output.lines().next()?;
    let (_, version) = first.split_once("Terraform v")?;
    let version = version.split_whitespace().next()?;
    (!version.is_empty()).then(|| version.to_string())
}

// "Plan: 1 to add, 0 to change, 2 to destroy." and per-resource notes
static RE_DESTROY_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([1-9]\d*) to destroy\b").unwrap());
// Action markers: "  - resource ...", "-/+ resource ...", and the "  - destroy" legend
static RE_DESTROY_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)will be (?:destroyed|deleted)|must be replaced|^\s*(?:-|-/\+|\+/-)\s+(?:resource|destroy)\b",
    )
    .unwrap()
});

/// Whether a plan would destroy or delete anything.
pub fn plan_is_destructive(plan_output: &str) -> bool {
    RE_DESTROY_COUNT.is_match(plan_output) || RE_DESTROY_ACTION.is_match(plan_output)
}
