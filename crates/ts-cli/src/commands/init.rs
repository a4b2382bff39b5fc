use std::path::Path;

use anyhow::Context;

use crate::config::{Config, prompt_for_config};
use crate::output;

pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    output::info("Initializing ts configuration...");

    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };

    let stdin = std::io::stdin();
    let config = prompt_for_config(&mut stdin.lock(), &mut std::io::stdout())
        .context("failed to read configuration")?;
    config.save(&path)?;

    output::success("Configuration saved successfully!");
    output::info(format!("Configuration file: {}", path.display()));

    if !config.has_cloudflare_config() {
        output::warning(
            "Cloudflare configuration is incomplete. Run 'ts init' again to update it, \
             or set CLOUDFLARE_API_TOKEN and CLOUDFLARE_ACCOUNT_ID.",
        );
    }
    output::info("Run 'ts doctor' to verify your setup.");
    Ok(())
}
