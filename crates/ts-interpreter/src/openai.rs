//! Model-backed interpreter: OpenAI-compatible chat completions.
//!
//! Sends the fixed DSL instruction prompt plus the operator text and parses
//! the reply as a `DslDocument`. Transport errors, non-2xx statuses, empty
//! replies and unparseable JSON all come back as `InterpretError`; nothing is
//! retried here.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ts_dsl::DslDocument;

use crate::Interpreter;
use crate::error::{InterpretError, InterpretResult};

/// Instruction prompt. Lists the five intents and their fields, and asks for
/// bare JSON.
const SYSTEM_PROMPT: &str = r#"Eres un traductor de peticiones en lenguaje natural a un DSL de infraestructura para Cloudflare.
Responde ÚNICAMENTE con un objeto JSON válido: sin markdown, sin explicaciones.

Campos comunes:
- intent: uno de "create_worker_and_bind_domain", "create_dns_record", "create_kv_namespace", "create_d1_database", "delete_dns_record"
- zone_name: dominio base, p. ej. "example.com" (usa "@" si el usuario se refiere a la raíz)
- hostname: FQDN, p. ej. "api.example.com"

create_worker_and_bind_domain:
- routing: { "mode": "custom_domain" | "route" } (opcional, por defecto "custom_domain")
- worker: { "name": texto de hasta 63 caracteres, "module": booleano, "compatibility_date": "YYYY-MM-DD" }
- bindings: { "kv": [identificadores], "d1": [identificadores] } (opcional)

create_dns_record:
- dns_record: { "type": "A" | "AAAA" | "CNAME" | "TXT" | "MX" | "NS", "content": "valor", "ttl": 300, "proxied": false }
- no incluyas routing ni worker

delete_dns_record:
- dns_record: { "type": "A" | "AAAA" | "CNAME" | "TXT" | "MX" | "NS", "content": "valor a eliminar" (opcional) }
- incluye solo lo necesario para identificar el registro

create_kv_namespace y create_d1_database: solo los campos comunes.

No inventes campos fuera de este esquema. Usa valores por defecto razonables."#;

/// Output budget for a translation.
const MAX_TOKENS: u32 = 500;

/// Near-deterministic sampling.
const TEMPERATURE: f32 = 0.1;

/// Configuration for the chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// API base URL, without the `/v1/...` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Chat completions request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completions response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the chat-completions endpoint.
pub struct OpenAiInterpreter {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiInterpreter {
    pub fn new(config: OpenAiConfig) -> InterpretResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InterpretError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// One-token request to check key and connectivity.
    pub async fn ping(&self) -> InterpretResult<()> {
        self.complete(None, "test", 1).await.map(|_| ())
    }

    async fn complete(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> InterpretResult<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InterpretError::Transport(format!(
                "status {status}: {}",
                truncate(&detail, 200)
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| InterpretError::Transport(format!("unreadable response body: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(InterpretError::EmptyResponse)
    }
}

#[async_trait]
impl Interpreter for OpenAiInterpreter {
    async fn interpret(&self, text: &str) -> InterpretResult<DslDocument> {
        let content = self.complete(Some(SYSTEM_PROMPT), text, MAX_TOKENS).await?;
        let json = strip_code_fences(&content);
        let doc: DslDocument = serde_json::from_str(json).map_err(|e| {
            InterpretError::ResponseParse(format!("{e}; raw: {}", truncate(&content, 200)))
        })?;
        tracing::debug!(intent = %doc.intent(), model = %self.config.model, "model produced DSL");
        Ok(doc)
    }

    fn tier_name(&self) -> &str {
        "model"
    }
}

/// Remove markdown code fences the model may wrap its JSON in.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        return match after_fence.find("```") {
            Some(end) => after_fence[..end].trim(),
            None => after_fence.trim(),
        };
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        return match after_fence.find("```") {
            Some(end) => after_fence[..end].trim(),
            None => after_fence.trim(),
        };
    }

    trimmed
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
