//! Text → DSL → validated document → Terraform files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ts_dsl::{ValidatedDocument, Validator};
use ts_interpreter::{OpenAiInterpreter, TieredInterpreter, Translation};
use ts_terraform::Renderer;

use crate::config::Config;

/// A rendered run, ready for Terraform.
#[derive(Debug)]
pub struct PreparedRun {
    pub work_dir: PathBuf,
    pub document: ValidatedDocument,
    /// Interpreter tier that produced the document.
    pub tier: String,
    pub fallback_reason: Option<String>,
}

/// Interpreter, validator and renderer for one invocation.
pub struct Pipeline {
    interpreter: TieredInterpreter,
    validator: Validator,
    renderer: Renderer,
    account_id: Option<String>,
}

impl Pipeline {
    pub fn new(interpreter: TieredInterpreter, account_id: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            interpreter,
            validator: Validator::new().context("failed to load the DSL schema")?,
            renderer: Renderer::new().context("failed to load Terraform templates")?,
            account_id,
        })
    }

    /// Model-backed when an API key is configured, rule-based otherwise.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let zone = config.default_zone().map(str::to_string);
        let interpreter = match config.openai() {
            Some(openai) => {
                let model = OpenAiInterpreter::new(openai)
                    .context("failed to build the model client")?;
                TieredInterpreter::new(Box::new(model), zone)
            }
            None => TieredInterpreter::offline(zone),
        };
        Self::new(interpreter, config.account_id().map(str::to_string))
    }

    /// Translate and validate.
    pub async fn interpret(&self, prompt: &str) -> anyhow::Result<(Translation, ValidatedDocument)> {
        let translation = self.interpreter.translate(prompt).await;
        tracing::info!(
            tier = %translation.tier,
            intent = %translation.document.intent(),
            "prompt translated"
        );
        let document = self
            .validator
            .validate(translation.document.clone())
            .context("DSL validation failed")?;
        Ok((translation, document))
    }

    /// Translate, validate and render into `out_dir` (or a fresh run dir).
    pub async fn prepare(&self, prompt: &str, out_dir: Option<&Path>) -> anyhow::Result<PreparedRun> {
        let (translation, document) = self.interpret(prompt).await?;
        let work_dir = self
            .renderer
            .render(&document, self.account_id.as_deref(), out_dir)
            .context("failed to render Terraform files")?;

        Ok(PreparedRun {
            work_dir,
            document,
            tier: translation.tier,
            fallback_reason: translation.fallback_reason,
        })
    }
}
