//! Rule-based interpreter: keyword and pattern matching, no network.
//!
//! Used when the model-backed path fails. Total by construction: any input
//! yields a document, with literal defaults filling whatever the text does
//! not say.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use ts_dsl::document::ROOT_MARKER;
use ts_dsl::domain::{FALLBACK_ZONE, worker_name_from_hostname, zone_from_hostname};
use ts_dsl::{
    Bindings, DnsRecord, DnsRecordSelector, DnsRecordType, DslDocument, Intent, Operation,
    Routing, WorkerSpec,
};

use crate::Interpreter;
use crate::error::InterpretResult;

/// Compatibility date stamped on fallback workers.
pub const DEFAULT_COMPATIBILITY_DATE: &str = "2024-01-01";

/// TXT content when the text gives none.
pub const DEFAULT_TXT_CONTENT: &str = "managed-by-terrasmart";

/// Documentation-range address for A records without an explicit target.
pub const DEFAULT_A_CONTENT: &str = "192.0.2.1";

pub const DEFAULT_TTL: u32 = 300;

/// Subdomain used when no hostname can be found in the text.
const DEFAULT_SUBDOMAIN: &str = "app";

// Hostname candidates, tried in order over the lower-cased text
static HOSTNAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:conecta|bind|domain|host).*?([a-z0-9.-]+\.[a-z]{2,})").unwrap(),
        Regex::new(r"([a-z0-9.-]+\.[a-z]{2,})").unwrap(),
    ]
});

// Quoted value after a content keyword: content "v=spf1 -all"
static RE_CONTENT_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:content|contenido|diga)\b\s*[:=]?\s*(?:"([^"]+)"|'([^']+)'|“([^”]+)”)"#,
    )
    .unwrap()
});

const DELETE_KEYWORDS: &[&str] = &["eliminar", "delete", "borrar", "quitar", "remove"];
const RECORD_KEYWORDS: &[&str] = &["dns", "record", "txt", "cname", "a record"];
const DNS_KEYWORDS: &[&str] = &["dns", "record", "cname", "a record"];
const KV_KEYWORDS: &[&str] = &["kv", "namespace", "storage"];
const DATABASE_KEYWORDS: &[&str] = &["d1", "database", "db"];

/// One row of the intent table: if `matches` holds, the text means `intent`.
pub struct IntentRule {
    pub name: &'static str,
    pub intent: Intent,
    pub matches: fn(&str) -> bool,
}

/// Intent rules in priority order. First match wins; no match means worker.
pub static INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        name: "delete_record",
        intent: Intent::DeleteDnsRecord,
        matches: |t| matches_any(t, DELETE_KEYWORDS) && matches_any(t, RECORD_KEYWORDS),
    },
    IntentRule {
        name: "dns_record",
        intent: Intent::CreateDnsRecord,
        matches: |t| matches_any(t, DNS_KEYWORDS),
    },
    IntentRule {
        name: "kv_namespace",
        intent: Intent::CreateKvNamespace,
        matches: |t| matches_any(t, KV_KEYWORDS),
    },
    IntentRule {
        name: "d1_database",
        intent: Intent::CreateD1Database,
        matches: |t| matches_any(t, DATABASE_KEYWORDS),
    },
];

/// Deterministic keyword interpreter.
#[derive(Debug, Clone, Default)]
pub struct FallbackInterpreter {
    default_zone: Option<String>,
}

impl FallbackInterpreter {
    pub fn new(default_zone: Option<String>) -> Self {
        Self { default_zone }
    }

    /// Translate text into a DSL document. Never fails.
    pub fn translate(&self, text: &str) -> DslDocument {
        let lower = text.to_lowercase();

        let hostname = self.resolve_hostname(text, &lower);
        let zone_name = zone_from_hostname(&hostname);
        let intent = classify_intent(&lower);
        tracing::debug!(%intent, %hostname, "fallback classified request");

        let operation = match intent {
            Intent::CreateWorkerAndBindDomain => Operation::CreateWorkerAndBindDomain {
                routing: Some(Routing::default()),
                worker: WorkerSpec {
                    name: worker_name_from_hostname(&hostname),
                    module: true,
                    compatibility_date: DEFAULT_COMPATIBILITY_DATE.into(),
                },
                bindings: Some(Bindings::default()),
            },
            Intent::CreateDnsRecord => {
                let record_type = infer_record_type(&lower).unwrap_or(DnsRecordType::Txt);
                let content = extract_content(text)
                    .unwrap_or_else(|| default_content(record_type, &zone_name));
                Operation::CreateDnsRecord {
                    dns_record: DnsRecord {
                        record_type,
                        content,
                        ttl: DEFAULT_TTL,
                        proxied: false,
                    },
                }
            }
            Intent::DeleteDnsRecord => Operation::DeleteDnsRecord {
                dns_record: DnsRecordSelector {
                    record_type: infer_record_type(&lower).unwrap_or(DnsRecordType::Txt),
                    content: extract_content(text),
                },
            },
            Intent::CreateKvNamespace => Operation::CreateKvNamespace,
            Intent::CreateD1Database => Operation::CreateD1Database,
        };

        DslDocument {
            zone_name: Some(zone_name),
            hostname: Some(hostname),
            operation,
        }
    }

    fn resolve_hostname(&self, text: &str, lower: &str) -> String {
        if text.contains(ROOT_MARKER) {
            return self
                .default_zone
                .clone()
                .unwrap_or_else(|| FALLBACK_ZONE.to_string());
        }

        if let Some(hostname) = extract_hostname(lower) {
            return hostname;
        }

        match &self.default_zone {
            Some(zone) => format!("{DEFAULT_SUBDOMAIN}.{zone}"),
            None => format!("{DEFAULT_SUBDOMAIN}.{FALLBACK_ZONE}"),
        }
    }
}

#[async_trait]
impl Interpreter for FallbackInterpreter {
    async fn interpret(&self, text: &str) -> InterpretResult<DslDocument> {
        Ok(self.translate(text))
    }

    fn tier_name(&self) -> &str {
        "fallback"
    }
}

/// Pick the intent for lower-cased text from `INTENT_RULES`.
pub fn classify_intent(lower: &str) -> Intent {
    INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(lower))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::CreateWorkerAndBindDomain)
}

/// Check if the text contains any of the given keywords.
fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// First hostname-looking token, preferring one that follows a bind/host verb.
fn extract_hostname(lower: &str) -> Option<String> {
    HOSTNAME_PATTERNS
        .iter()
        .find_map(|re| re.captures(lower))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('.').to_string())
        .filter(|h| !h.is_empty())
}

fn infer_record_type(lower: &str) -> Option<DnsRecordType> {
    if matches_any(lower, &["txt", "text"]) {
        Some(DnsRecordType::Txt)
    } else if lower.contains("cname") {
        Some(DnsRecordType::Cname)
    } else if matches_any(lower, &["a record", "tipo a"]) {
        Some(DnsRecordType::A)
    } else {
        None
    }
}

/// Quoted text after a content keyword, original case preserved.
fn extract_content(text: &str) -> Option<String> {
    RE_CONTENT_HINT
        .captures(text)
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty())
}

fn default_content(record_type: DnsRecordType, zone_name: &str) -> String {
    match record_type {
        DnsRecordType::Cname => zone_name.to_string(),
        DnsRecordType::A => DEFAULT_A_CONTENT.to_string(),
        _ => DEFAULT_TXT_CONTENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn translate(text: &str) -> DslDocument {
        FallbackInterpreter::default().translate(text)
    }

    fn translate_with_zone(text: &str, zone: &str) -> DslDocument {
        FallbackInterpreter::new(Some(zone.into())).translate(text)
    }

    // ── Scenarios ───────────────────────────────────────────────

    #[test]
    fn worker_bound_to_hostname() {
        let doc = translate("Create a Worker and connect it to api.example.com");
        assert_eq!(doc.intent(), Intent::CreateWorkerAndBindDomain);
        assert_eq!(doc.zone_name.as_deref(), Some("example.com"));
        assert_eq!(doc.hostname.as_deref(), Some("api.example.com"));
        assert_eq!(
            doc.worker(),
            Some(&WorkerSpec {
                name: "api-example-com".into(),
                module: true,
                compatibility_date: "2024-01-01".into(),
            })
        );
    }

    #[test]
    fn dns_record_for_hostname() {
        let doc = translate("Create DNS record for blog.example.com");
        assert_eq!(
            doc,
            DslDocument {
                zone_name: Some("example.com".into()),
                hostname: Some("blog.example.com".into()),
                operation: Operation::CreateDnsRecord {
                    dns_record: DnsRecord {
                        record_type: DnsRecordType::Txt,
                        content: "managed-by-terrasmart".into(),
                        ttl: 300,
                        proxied: false,
                    },
                },
            }
        );
    }

    #[test]
    fn kv_storage_for_hostname() {
        let doc = translate("Add KV storage for cache.example.com");
        assert_eq!(
            doc,
            DslDocument::new(Operation::CreateKvNamespace)
                .with_zone("example.com")
                .with_hostname("cache.example.com")
        );
    }

    #[test]
    fn d1_database() {
        let doc = translate("Provision a database at data.example.org");
        assert_eq!(doc.intent(), Intent::CreateD1Database);
        assert_eq!(doc.zone_name.as_deref(), Some("example.org"));
    }

    // ── Intent priority ─────────────────────────────────────────

    #[test]
    fn delete_needs_a_record_keyword() {
        assert_eq!(
            classify_intent("delete the txt record on x.example.com"),
            Intent::DeleteDnsRecord
        );
        assert_eq!(classify_intent("eliminar registro dns"), Intent::DeleteDnsRecord);
        // Delete without a record keyword falls through the table
        assert_eq!(classify_intent("remove kv namespace"), Intent::CreateKvNamespace);
        assert_eq!(classify_intent("delete it"), Intent::CreateWorkerAndBindDomain);
    }

    #[test]
    fn dns_beats_kv_and_database() {
        assert_eq!(classify_intent("dns record for the kv db"), Intent::CreateDnsRecord);
        assert_eq!(classify_intent("kv namespace near the database"), Intent::CreateKvNamespace);
    }

    #[test]
    fn no_keywords_means_worker() {
        assert_eq!(classify_intent("hello world"), Intent::CreateWorkerAndBindDomain);
        assert_eq!(classify_intent(""), Intent::CreateWorkerAndBindDomain);
    }

    #[test]
    fn each_rule_matches_its_own_keywords() {
        let samples = [
            ("delete_record", "remove the cname"),
            ("dns_record", "add a cname"),
            ("kv_namespace", "a storage namespace"),
            ("d1_database", "a d1 please"),
        ];
        for (name, text) in samples {
            let rule = INTENT_RULES.iter().find(|r| r.name == name).unwrap();
            assert!((rule.matches)(text), "{name} should match {text:?}");
        }
    }

    // ── Hostname resolution ─────────────────────────────────────

    #[test]
    fn verb_near_domain_preferred() {
        let doc = translate("from old.example.net bind to new.example.com");
        assert_eq!(doc.hostname.as_deref(), Some("new.example.com"));
    }

    #[test]
    fn root_marker_uses_default_zone() {
        let doc = translate_with_zone("TXT record at @ saying hi", "mysite.dev");
        assert_eq!(doc.hostname.as_deref(), Some("mysite.dev"));
        assert_eq!(doc.zone_name.as_deref(), Some("mysite.dev"));
    }

    #[test]
    fn root_marker_without_default_zone() {
        let doc = translate("point @ somewhere");
        assert_eq!(doc.hostname.as_deref(), Some("example.com"));
    }

    #[test]
    fn no_hostname_uses_app_subdomain() {
        assert_eq!(
            translate_with_zone("create a worker", "mysite.dev").hostname.as_deref(),
            Some("app.mysite.dev")
        );
        assert_eq!(
            translate("create a worker").hostname.as_deref(),
            Some("app.example.com")
        );
    }

    #[test]
    fn hostname_is_lower_cased() {
        let doc = translate("Create DNS record for Blog.Example.COM");
        assert_eq!(doc.hostname.as_deref(), Some("blog.example.com"));
    }

    // ── DNS record details ──────────────────────────────────────

    #[test]
    fn txt_content_from_quotes() {
        let doc = translate(r#"Create a TXT record on example.com with content "Hello Mundo""#);
        let Operation::CreateDnsRecord { dns_record } = doc.operation else {
            panic!("expected dns operation");
        };
        assert_eq!(dns_record.record_type, DnsRecordType::Txt);
        assert_eq!(dns_record.content, "Hello Mundo");
    }

    #[test]
    fn content_runs_to_matching_quote() {
        assert_eq!(
            extract_content(r#"txt record with content "it's live""#).as_deref(),
            Some("it's live")
        );
        assert_eq!(
            extract_content(r#"content: 'say "hi"'"#).as_deref(),
            Some(r#"say "hi""#)
        );
        assert_eq!(
            extract_content("diga “hola, mundo”").as_deref(),
            Some("hola, mundo")
        );
        assert_eq!(extract_content(r#"content "unterminated"#), None);
    }

    #[test]
    fn cname_points_at_zone() {
        let doc = translate("add a cname for www.example.com");
        let Operation::CreateDnsRecord { dns_record } = doc.operation else {
            panic!("expected dns operation");
        };
        assert_eq!(dns_record.record_type, DnsRecordType::Cname);
        assert_eq!(dns_record.content, "example.com");
    }

    #[test]
    fn a_record_uses_documentation_address() {
        let doc = translate("create an a record for home.example.com");
        let Operation::CreateDnsRecord { dns_record } = doc.operation else {
            panic!("expected dns operation");
        };
        assert_eq!(dns_record.record_type, DnsRecordType::A);
        assert_eq!(dns_record.content, "192.0.2.1");
    }

    #[test]
    fn delete_omits_content_without_hint() {
        let doc = translate("delete the cname record for www.example.com");
        assert_eq!(
            doc.operation,
            Operation::DeleteDnsRecord {
                dns_record: DnsRecordSelector {
                    record_type: DnsRecordType::Cname,
                    content: None,
                },
            }
        );
    }

    #[test]
    fn delete_keeps_quoted_content() {
        let doc = translate(r#"borrar el registro txt con contenido "Hello Mundo" de example.com"#);
        let Operation::DeleteDnsRecord { dns_record } = doc.operation else {
            panic!("expected delete operation");
        };
        assert_eq!(dns_record.record_type, DnsRecordType::Txt);
        assert_eq!(dns_record.content.as_deref(), Some("Hello Mundo"));
    }

    // ── Worker naming ───────────────────────────────────────────

    #[test]
    fn long_hostname_truncates_worker_name() {
        let host = format!("{}.example.com", "a".repeat(70));
        let doc = translate(&format!("deploy a worker on {host}"));
        assert_eq!(doc.worker().unwrap().name.len(), 63);
    }

    #[tokio::test]
    async fn interpreter_trait_never_fails() {
        let interpreter = FallbackInterpreter::default();
        let doc = interpreter.interpret("anything at all").await.unwrap();
        assert_eq!(doc.intent(), Intent::CreateWorkerAndBindDomain);
        assert_eq!(interpreter.tier_name(), "fallback");
    }

    proptest! {
        #[test]
        fn translate_is_total(text in ".*", zone in proptest::option::of("[a-z]{1,10}\\.[a-z]{2,4}")) {
            let doc = FallbackInterpreter::new(zone).translate(&text);
            prop_assert!(doc.zone_name.is_some());
            prop_assert!(doc.hostname.is_some());
            if let Some(worker) = doc.worker() {
                prop_assert!(worker.name.chars().count() <= 63);
            }
        }
    }
}
