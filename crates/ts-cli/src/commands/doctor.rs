use std::path::Path;

use ts_interpreter::OpenAiInterpreter;
use ts_terraform::terraform_version;

use crate::config::Config;
use crate::output;

const TERRAFORM_MISSING: &str = "Terraform not found in PATH";
const OPENAI_KEY_MISSING: &str = "OpenAI API key not configured (run 'ts init')";

/// Outcome of the environment checks.
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub passed: Vec<String>,
    pub issues: Vec<String>,
}

impl DoctorReport {
    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn issue(&mut self, msg: impl Into<String>) {
        self.issues.push(msg.into());
    }

    /// Follow-up actions for the issues found.
    pub fn recommendations(&self) -> Vec<&'static str> {
        let any = |needle: &str| self.issues.iter().any(|i| i.contains(needle));
        let mut out = Vec::new();
        if any("OpenAI API key not configured") {
            out.push("Run 'ts init' to configure API keys");
        }
        if any(TERRAFORM_MISSING) {
            out.push("Install Terraform: https://terraform.io/downloads");
        }
        if any("Cloudflare") {
            out.push("Get a Cloudflare API token: https://dash.cloudflare.com/profile/api-tokens");
        }
        out
    }

    /// Configuration checks; no I/O.
    pub fn check_config(&mut self, config: &Config) {
        if config.openai_api_key().is_some() {
            self.pass("OpenAI API key configured");
        } else {
            self.issue(OPENAI_KEY_MISSING);
        }

        if config.cloudflare_api_token().is_some() {
            self.pass("Cloudflare API token configured");
        } else {
            self.issue("Cloudflare API token not configured");
        }

        if config.account_id().is_some() {
            self.pass("Cloudflare account ID configured");
        } else {
            self.issue("Cloudflare account ID not configured");
        }

        if let Some(zone) = config.default_zone() {
            self.pass(format!("Default zone: {zone}"));
        }
    }

    /// One-token request against the configured model.
    pub async fn check_model(&mut self, config: &Config) {
        let Some(openai) = config.openai() else {
            return;
        };
        let model = openai.model.clone();
        let result = match OpenAiInterpreter::new(openai) {
            Ok(client) => client.ping().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.pass(format!("OpenAI API connectivity ({model})")),
            Err(e) => {
                let mut msg = e.to_string();
                if msg.len() > 100 {
                    let cut = (0..=100).rev().find(|&i| msg.is_char_boundary(i)).unwrap_or(0);
                    msg.truncate(cut);
                    msg.push_str("...");
                }
                self.issue(format!("OpenAI API test failed: {msg}"));
            }
        }
    }
}

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    output::info("Running ts diagnostics...");
    let mut report = DoctorReport::default();

    match terraform_version().await {
        Ok(version) => report.pass(format!("Terraform {version}")),
        Err(e) => {
            tracing::debug!(error = %e, "terraform check failed");
            report.issue(TERRAFORM_MISSING);
        }
    }

    let config = Config::load(config_path)?;
    report.check_config(&config);
    report.check_model(&config).await;

    for line in &report.passed {
        output::step(line);
    }

    if report.issues.is_empty() {
        output::success("All checks passed! ts is ready to use.");
        return Ok(());
    }

    println!("\n❌ Issues found:");
    for issue in &report.issues {
        println!("  • {issue}");
    }
    println!("\nRecommendations:");
    for rec in report.recommendations() {
        println!("  • {rec}");
    }
    Ok(())
}
