//! Natural-language to DSL translation.
//!
//! Converts operator text ("create a worker on api.example.com") into a
//! `DslDocument`.
//!
//! Two tiers:
//! - **Model-backed** (`openai`): chat-completions call with a fixed
//!   instruction prompt.
//! - **Fallback** (`fallback`): deterministic keyword rules, always succeeds.
//!
//! `TieredInterpreter` runs the first and drops to the second exactly once on
//! any failure, then reconciles the result with the configured default zone
//! (`postprocess`).

pub mod error;
pub mod fallback;
pub mod openai;
pub mod postprocess;
pub mod tiered;

use async_trait::async_trait;
use ts_dsl::DslDocument;

pub use error::{InterpretError, InterpretResult};
pub use fallback::FallbackInterpreter;
pub use openai::{OpenAiConfig, OpenAiInterpreter};
pub use postprocess::PostProcessor;
pub use tiered::{TieredInterpreter, Translation};

/// Trait for engines that turn natural language into a DSL document.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Translate operator text into a (not yet validated) DSL document.
    async fn interpret(&self, text: &str) -> InterpretResult<DslDocument>;

    /// Name of this tier (for logging).
    fn tier_name(&self) -> &str;
}
