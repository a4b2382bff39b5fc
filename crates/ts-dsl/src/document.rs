use std::fmt;

use serde::{Deserialize, Serialize};

/// Token operators (and the model) use to mean "the zone apex".
pub const ROOT_MARKER: &str = "@";

/// Operation type a DSL document requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateWorkerAndBindDomain,
    CreateDnsRecord,
    CreateKvNamespace,
    #[serde(rename = "create_d1_database")]
    CreateD1Database,
    DeleteDnsRecord,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::CreateWorkerAndBindDomain,
        Intent::CreateDnsRecord,
        Intent::CreateKvNamespace,
        Intent::CreateD1Database,
        Intent::DeleteDnsRecord,
    ];

    /// Wire name of the intent (e.g. `"create_dns_record"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CreateWorkerAndBindDomain => "create_worker_and_bind_domain",
            Intent::CreateDnsRecord => "create_dns_record",
            Intent::CreateKvNamespace => "create_kv_namespace",
            Intent::CreateD1Database => "create_d1_database",
            Intent::DeleteDnsRecord => "delete_dns_record",
        }
    }

    /// Whether the intent operates on a DNS record.
    pub fn is_dns(&self) -> bool {
        matches!(self, Intent::CreateDnsRecord | Intent::DeleteDnsRecord)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worker is attached to its hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    #[default]
    CustomDomain,
    Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Routing {
    #[serde(default)]
    pub mode: RoutingMode,
}

/// Worker script settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Script name (Cloudflare caps this at 63 characters).
    pub name: String,
    /// ES module syntax (`true`) or service-worker syntax.
    #[serde(default = "default_module")]
    pub module: bool,
    /// Runtime compatibility date, `YYYY-MM-DD`.
    pub compatibility_date: String,
}

fn default_module() -> bool {
    true
}

/// Storage bindings attached to a worker. Entries are JS binding names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub kv: Vec<String>,
    #[serde(default)]
    pub d1: Vec<String>,
}

/// DNS record types the DSL can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Txt,
    Mx,
    Ns,
}

impl DnsRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::Aaaa => "AAAA",
            DnsRecordType::Cname => "CNAME",
            DnsRecordType::Txt => "TXT",
            DnsRecordType::Mx => "MX",
            DnsRecordType::Ns => "NS",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub content: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

fn default_ttl() -> u32 {
    300
}

/// Just enough of a record to find it for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordSelector {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Intent plus the sub-structures that intent requires.
///
/// Serialized internally tagged, so the `intent` key sits next to the
/// variant's own fields in the flat JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Operation {
    CreateWorkerAndBindDomain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        routing: Option<Routing>,
        worker: WorkerSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bindings: Option<Bindings>,
    },
    CreateDnsRecord {
        dns_record: DnsRecord,
    },
    CreateKvNamespace,
    #[serde(rename = "create_d1_database")]
    CreateD1Database,
    DeleteDnsRecord {
        dns_record: DnsRecordSelector,
    },
}

impl Operation {
    pub fn intent(&self) -> Intent {
        match self {
            Operation::CreateWorkerAndBindDomain { .. } => Intent::CreateWorkerAndBindDomain,
            Operation::CreateDnsRecord { .. } => Intent::CreateDnsRecord,
            Operation::CreateKvNamespace => Intent::CreateKvNamespace,
            Operation::CreateD1Database => Intent::CreateD1Database,
            Operation::DeleteDnsRecord { .. } => Intent::DeleteDnsRecord,
        }
    }
}

/// A DSL document as produced by an interpreter.
///
/// `zone_name` and `hostname` are optional here because model output may
/// omit them; the post-processor fills them in and the validator requires
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(flatten)]
    pub operation: Operation,
}

impl DslDocument {
    pub fn new(operation: Operation) -> Self {
        Self {
            zone_name: None,
            hostname: None,
            operation,
        }
    }

    pub fn with_zone(mut self, zone_name: impl Into<String>) -> Self {
        self.zone_name = Some(zone_name.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn intent(&self) -> Intent {
        self.operation.intent()
    }

    pub fn worker(&self) -> Option<&WorkerSpec> {
        match &self.operation {
            Operation::CreateWorkerAndBindDomain { worker, .. } => Some(worker),
            _ => None,
        }
    }

    /// Render as the flat JSON document.
    pub fn to_value(&self) -> serde_json::Value {
        // Every field is a string, bool, integer or a container of those.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn worker_document_from_flat_json() {
        let doc: DslDocument = serde_json::from_value(json!({
            "intent": "create_worker_and_bind_domain",
            "zone_name": "example.com",
            "hostname": "api.example.com",
            "routing": {"mode": "route"},
            "worker": {"name": "api-example-com", "module": true, "compatibility_date": "2024-01-01"},
            "bindings": {"kv": ["CACHE"], "d1": []}
        }))
        .unwrap();

        assert_eq!(doc.intent(), Intent::CreateWorkerAndBindDomain);
        assert_eq!(doc.hostname.as_deref(), Some("api.example.com"));
        let Operation::CreateWorkerAndBindDomain {
            routing, bindings, ..
        } = &doc.operation
        else {
            panic!("expected worker operation");
        };
        assert_eq!(routing.as_ref().unwrap().mode, RoutingMode::Route);
        assert_eq!(bindings.as_ref().unwrap().kv, vec!["CACHE".to_string()]);
        assert_eq!(doc.worker().unwrap().name, "api-example-com");
    }

    #[test]
    fn unit_intent_round_trips_through_flat_json() {
        let doc = DslDocument::new(Operation::CreateKvNamespace)
            .with_zone("example.com")
            .with_hostname("cache.example.com");
        let value = doc.to_value();
        assert_eq!(
            value,
            json!({
                "intent": "create_kv_namespace",
                "zone_name": "example.com",
                "hostname": "cache.example.com"
            })
        );
        let back: DslDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn d1_intent_wire_name() {
        let doc: DslDocument =
            serde_json::from_value(json!({"intent": "create_d1_database"})).unwrap();
        assert_eq!(doc.intent(), Intent::CreateD1Database);
        assert_eq!(doc.intent().to_string(), "create_d1_database");
        assert!(doc.zone_name.is_none());
    }

    #[test]
    fn dns_record_defaults_ttl_and_proxied() {
        let doc: DslDocument = serde_json::from_value(json!({
            "intent": "create_dns_record",
            "dns_record": {"type": "CNAME", "content": "example.com"}
        }))
        .unwrap();
        let Operation::CreateDnsRecord { dns_record } = doc.operation else {
            panic!("expected dns operation");
        };
        assert_eq!(dns_record.record_type, DnsRecordType::Cname);
        assert_eq!(dns_record.ttl, 300);
        assert!(!dns_record.proxied);
    }

    #[test]
    fn delete_selector_omits_absent_content() {
        let doc = DslDocument::new(Operation::DeleteDnsRecord {
            dns_record: DnsRecordSelector {
                record_type: DnsRecordType::Txt,
                content: None,
            },
        });
        assert_eq!(
            doc.to_value(),
            json!({"intent": "delete_dns_record", "dns_record": {"type": "TXT"}})
        );
    }

    #[test]
    fn unknown_intent_rejected() {
        let result: Result<DslDocument, _> =
            serde_json::from_value(json!({"intent": "create_pizza"}));
        assert!(result.is_err());
    }

    #[test]
    fn worker_intent_requires_worker() {
        let result: Result<DslDocument, _> = serde_json::from_value(json!({
            "intent": "create_worker_and_bind_domain",
            "zone_name": "example.com"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn dns_intents_flagged() {
        let dns: Vec<_> = Intent::ALL.iter().filter(|i| i.is_dns()).collect();
        assert_eq!(
            dns,
            vec![&Intent::CreateDnsRecord, &Intent::DeleteDnsRecord]
        );
    }
}
