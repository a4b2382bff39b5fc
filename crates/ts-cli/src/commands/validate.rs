use std::path::Path;

use anyhow::Context;

use crate::output;

pub fn run(file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let doc = ts_dsl::validate_value(&value).context("DSL validation failed")?;
    output::success(format!(
        "{} is valid ({} on {})",
        file.display(),
        doc.intent(),
        doc.hostname()
    ));
    Ok(())
}
