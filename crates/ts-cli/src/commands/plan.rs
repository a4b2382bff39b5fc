use std::path::Path;

use anyhow::Context;
use ts_terraform::TerraformExecutor;

use crate::config::Config;
use crate::output;
use crate::pipeline::{Pipeline, PreparedRun};

pub async fn plan(config_path: Option<&Path>, prompt: &str, dir: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    config.validate_required()?;

    output::info(format!("Processing: {prompt}"));
    let run = prepare(&config, prompt, dir).await?;

    let executor = TerraformExecutor::new(&run.work_dir)?
        .with_api_token(config.cloudflare_api_token().map(str::to_string));
    executor.init().await.context("terraform init failed")?;
    output::step("Terraform initialized");

    let plan = executor.plan().await.context("terraform plan failed")?;
    output::step("Terraform plan completed");
    output::section("TERRAFORM PLAN OUTPUT", &plan);

    output::success(format!(
        "Plan completed successfully! Files in: {}",
        run.work_dir.display()
    ));
    Ok(())
}

pub async fn dryrun(config_path: Option<&Path>, prompt: &str, dir: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(config_path)?;
    config.validate_required()?;

    output::info(format!("Dry run for: {prompt}"));
    let run = prepare(&config, prompt, dir).await?;

    output::success(format!(
        "Dry run completed! Files generated in: {}",
        run.work_dir.display()
    ));
    output::info("Run 'ts plan' with the same prompt to execute terraform plan.");
    Ok(())
}

async fn prepare(config: &Config, prompt: &str, dir: Option<&Path>) -> anyhow::Result<PreparedRun> {
    let pipeline = Pipeline::from_config(config)?;
    let run = pipeline.prepare(prompt, dir).await?;

    match &run.fallback_reason {
        Some(reason) => output::warning(format!(
            "Model translation unavailable ({reason}); used rule-based fallback"
        )),
        None => output::step("Natural language converted to DSL"),
    }
    output::step(format!("DSL validation passed ({})", run.document.intent()));
    output::step(format!(
        "Terraform files generated in: {}",
        run.work_dir.display()
    ));
    Ok(run)
}
