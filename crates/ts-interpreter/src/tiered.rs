//! Tiered interpreter: model first, rule-based fallback.
//!
//! Runs the primary (model-backed) interpreter if one is configured. On any
//! error it falls back to the rule-based interpreter exactly once. The result
//! of either tier goes through the post-processor before it is returned.

use async_trait::async_trait;
use ts_dsl::DslDocument;

use crate::error::InterpretResult;
use crate::fallback::FallbackInterpreter;
use crate::postprocess::PostProcessor;
use crate::Interpreter;

/// Outcome of a tiered translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub document: DslDocument,
    /// Tier that produced the document.
    pub tier: String,
    /// Why the primary tier was skipped, if it was.
    pub fallback_reason: Option<String>,
}

impl Translation {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Composite interpreter: optional primary, mandatory fallback.
pub struct TieredInterpreter {
    primary: Option<Box<dyn Interpreter>>,
    fallback: FallbackInterpreter,
    post: PostProcessor,
}

impl TieredInterpreter {
    pub fn new(primary: Box<dyn Interpreter>, default_zone: Option<String>) -> Self {
        Self {
            primary: Some(primary),
            fallback: FallbackInterpreter::new(default_zone.clone()),
            post: PostProcessor::new(default_zone),
        }
    }

    /// Rule-based only, no model configured.
    pub fn offline(default_zone: Option<String>) -> Self {
        Self {
            primary: None,
            fallback: FallbackInterpreter::new(default_zone.clone()),
            post: PostProcessor::new(default_zone),
        }
    }

    pub async fn translate(&self, text: &str) -> Translation {
        let (document, tier, fallback_reason) = match &self.primary {
            Some(primary) => match primary.interpret(text).await {
                Ok(doc) => (doc, primary.tier_name().to_string(), None),
                Err(e) => {
                    tracing::warn!(
                        tier = primary.tier_name(),
                        error = %e,
                        "interpretation failed, using fallback rules"
                    );
                    (
                        self.fallback.translate(text),
                        self.fallback.tier_name().to_string(),
                        Some(e.to_string()),
                    )
                }
            },
            None => {
                tracing::debug!("no model configured, using fallback rules");
                (
                    self.fallback.translate(text),
                    self.fallback.tier_name().to_string(),
                    Some("no model configured".to_string()),
                )
            }
        };

        Translation {
            document: self.post.process(document),
            tier,
            fallback_reason,
        }
    }
}

#[async_trait]
impl Interpreter for TieredInterpreter {
    async fn interpret(&self, text: &str) -> InterpretResult<DslDocument> {
        Ok(self.translate(text).await.document)
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ts_dsl::{DnsRecord, DnsRecordType, Intent, Operation};

    use crate::error::InterpretError;

    /// Mock interpreter that returns a fixed document or a transport error,
    /// counting how often it is called.
    struct MockInterpreter {
        result: Option<DslDocument>,
        calls: Arc<AtomicUsize>,
    }

    impl MockInterpreter {
        fn hit(doc: DslDocument) -> Self {
            Self {
                result: Some(doc),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn fail() -> Self {
            Self {
                result: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Interpreter for MockInterpreter {
        async fn interpret(&self, _text: &str) -> InterpretResult<DslDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| InterpretError::Transport("connection refused".into()))
        }

        fn tier_name(&self) -> &str {
            "model"
        }
    }

    fn txt_doc(zone: &str, host: &str) -> DslDocument {
        DslDocument::new(Operation::CreateDnsRecord {
            dns_record: DnsRecord {
                record_type: DnsRecordType::Txt,
                content: "from-model".into(),
                ttl: 300,
                proxied: false,
            },
        })
        .with_zone(zone)
        .with_hostname(host)
    }

    #[tokio::test]
    async fn primary_hit_skips_fallback() {
        let engine = TieredInterpreter::new(
            Box::new(MockInterpreter::hit(txt_doc("example.com", "a.example.com"))),
            None,
        );

        let result = engine.translate("add txt record").await;
        assert_eq!(result.tier, "model");
        assert!(!result.used_fallback());
        assert_eq!(result.document, txt_doc("example.com", "a.example.com"));
    }

    #[tokio::test]
    async fn primary_failure_uses_fallback_once() {
        let mock = MockInterpreter::fail();
        let calls = mock.calls.clone();
        let engine = TieredInterpreter::new(Box::new(mock), None);

        let result = engine
            .translate("Add KV storage for cache.example.com")
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.tier, "fallback");
        assert!(result.fallback_reason.unwrap().contains("connection refused"));
        assert_eq!(result.document.intent(), Intent::CreateKvNamespace);
        assert_eq!(result.document.hostname.as_deref(), Some("cache.example.com"));
    }

    #[tokio::test]
    async fn model_output_is_post_processed() {
        let engine = TieredInterpreter::new(
            Box::new(MockInterpreter::hit(txt_doc("other.com", "foo.other.com"))),
            Some("example.com".into()),
        );

        let doc = engine.translate("anything").await.document;
        assert_eq!(doc.zone_name.as_deref(), Some("example.com"));
        assert_eq!(doc.hostname.as_deref(), Some("foo.example.com"));
    }

    #[tokio::test]
    async fn fallback_output_is_post_processed() {
        let engine = TieredInterpreter::new(
            Box::new(MockInterpreter::fail()),
            Some("mysite.dev".into()),
        );

        let doc = engine
            .translate("Create DNS record for blog.example.com")
            .await
            .document;
        assert_eq!(doc.zone_name.as_deref(), Some("mysite.dev"));
        assert_eq!(doc.hostname.as_deref(), Some("blog.mysite.dev"));
    }

    #[tokio::test]
    async fn offline_reports_reason() {
        let engine = TieredInterpreter::offline(None);
        let result = engine.translate("Create a Worker on api.example.com").await;
        assert_eq!(result.tier, "fallback");
        assert_eq!(result.fallback_reason.as_deref(), Some("no model configured"));
        assert_eq!(result.document.intent(), Intent::CreateWorkerAndBindDomain);
    }

    #[tokio::test]
    async fn trait_impl_returns_document() {
        let engine = TieredInterpreter::offline(None);
        let doc = engine.interpret("Add KV storage for cache.example.com").await.unwrap();
        assert_eq!(doc.intent(), Intent::CreateKvNamespace);
        assert_eq!(engine.tier_name(), "tiered");
    }
}
