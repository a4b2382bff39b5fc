//! Shared harness: a mocked chat-completions endpoint plus a scratch
//! directory, wired into the real CLI pipeline.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ts_cli::{Config, Pipeline};

pub const ACCOUNT_ID: &str = "acc-e2e";

/// Mocked model endpoint and a temp dir for rendered runs.
pub struct TestHarness {
    pub server: MockServer,
    pub tmp: TempDir,
    pub config: Config,
}

impl TestHarness {
    /// Model-backed config pointing at the mock server, no default zone.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.auth.openai_api_key = Some("sk-e2e".into());
        config.auth.cloudflare_api_token = Some("cf-e2e".into());
        config.defaults.account_id = Some(ACCOUNT_ID.into());
        config.defaults.api_base = server.uri();

        Self {
            server,
            tmp: TempDir::new().expect("temp dir"),
            config,
        }
    }

    pub async fn with_default_zone(zone: &str) -> Self {
        let mut h = Self::new().await;
        h.config.defaults.zone = Some(zone.into());
        h
    }

    /// Model replies with `content` as the assistant message.
    pub async fn model_replies(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
            .mount(&self.server)
            .await;
    }

    /// Model replies with a DSL document.
    pub async fn model_returns(&self, doc: Value) {
        self.model_replies(&doc.to_string()).await;
    }

    pub async fn model_fails(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream error"))
            .mount(&self.server)
            .await;
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(&self.config).expect("pipeline builds")
    }

    pub fn run_dir(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }
}

pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

pub fn read(dir: &Path, file: &str) -> String {
    std::fs::read_to_string(dir.join(file))
        .unwrap_or_else(|e| panic!("reading {}: {e}", dir.join(file).display()))
}
