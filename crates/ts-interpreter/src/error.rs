//! Interpreter error types.

use thiserror::Error;

/// Failures of the model-backed path. All of them trigger the fallback.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("invalid DSL JSON from model: {0}")]
    ResponseParse(String),

    #[error("model client setup failed: {0}")]
    Client(String),
}

/// Convenience alias for interpreter results.
pub type InterpretResult<T> = Result<T, InterpretError>;
