use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use ts_dsl::Intent;
use ts_terraform::{TerraformExecutor, latest_run_dir, plan_is_destructive, read_run_document};

use crate::config::Config;
use crate::output;

pub async fn run(config_path: Option<&Path>, approve: bool, dir: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    let work_dir = resolve_run_dir(dir, Path::new("."))?;

    let executor = TerraformExecutor::new(&work_dir)?
        .with_api_token(config.cloudflare_api_token().map(str::to_string));

    let deleting = match read_run_document(&work_dir) {
        Ok(doc) => doc.intent() == Intent::DeleteDnsRecord,
        Err(e) => {
            tracing::warn!(error = %e, "no run document, applying as a create run");
            false
        }
    };

    // Dry-run directories have never been initialized.
    executor.init().await.context("terraform init failed")?;

    if !approve {
        let plan = executor.plan().await.context("terraform plan failed")?;
        if plan_is_destructive(&plan) {
            let stdin = std::io::stdin();
            let proceed = output::confirm(
                &mut stdin.lock(),
                &mut std::io::stdout(),
                "⚠️  This plan contains destructive changes. Continue?",
            )?;
            if !proceed {
                output::info("Apply cancelled.");
                return Ok(());
            }
        }
    }

    let apply_output = executor.apply(approve).await.context("terraform apply failed")?;
    output::step("Terraform apply completed");
    if !apply_output.is_empty() {
        output::section("TERRAFORM APPLY OUTPUT", &apply_output);
    }

    if deleting {
        // The apply only adopted the record; destroying it is the actual delete.
        let destroy_output = executor
            .destroy(approve)
            .await
            .context("terraform destroy failed")?;
        output::step("DNS record deleted");
        if !destroy_output.is_empty() {
            output::section("TERRAFORM DESTROY OUTPUT", &destroy_output);
        }
    }

    output::success("Apply completed successfully!");
    Ok(())
}

/// Explicit `--dir`, else the newest run under `<root>/terraform`.
fn resolve_run_dir(dir: Option<&Path>, root: &Path) -> anyhow::Result<PathBuf> {
    if let Some(dir) = dir {
        if !dir.is_dir() {
            bail!("working directory does not exist: {}", dir.display());
        }
        return Ok(dir.to_path_buf());
    }

    let Some(latest) = latest_run_dir(root) else {
        bail!("no previous runs found, run 'ts plan' first");
    };
    output::info(format!("Using latest run directory: {}", latest.display()));
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_must_exist() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_run_dir(Some(&tmp.path().join("missing")), tmp.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(
            resolve_run_dir(Some(tmp.path()), Path::new("/unused")).unwrap(),
            tmp.path()
        );
    }

    #[test]
    fn latest_run_used_by_default() {
        let tmp = TempDir::new().unwrap();
        let run = tmp.path().join("terraform").join("20250101_000000");
        std::fs::create_dir_all(&run).unwrap();
        assert_eq!(resolve_run_dir(None, tmp.path()).unwrap(), run);
    }

    #[test]
    fn no_runs_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_run_dir(None, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("run 'ts plan' first"));
    }
}
