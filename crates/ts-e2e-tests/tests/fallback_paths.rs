//! E2E tests for the one-shot fallback: model failures and offline runs.

mod helpers;

use helpers::{TestHarness, read};
use ts_cli::{Config, Pipeline};
use ts_dsl::{DnsRecordType, Intent, Operation};

/// Server error → fallback rules produce the worker scenario.
#[tokio::test]
async fn e2e_server_error_falls_back() {
    let h = TestHarness::new().await;
    h.model_fails(500).await;

    let (translation, doc) = h
        .pipeline()
        .interpret("Create a Worker and connect it to api.example.com")
        .await
        .unwrap();

    assert_eq!(translation.tier, "fallback");
    assert!(translation.fallback_reason.unwrap().contains("500"));
    assert_eq!(doc.intent(), Intent::CreateWorkerAndBindDomain);
    assert_eq!(doc.zone_name(), "example.com");
    assert_eq!(doc.hostname(), "api.example.com");
    let worker = doc.worker().unwrap();
    assert_eq!(worker.name, "api-example-com");
    assert!(worker.module);
    assert_eq!(worker.compatibility_date, "2024-01-01");
}

/// Unparseable model output → fallback, DNS scenario.
#[tokio::test]
async fn e2e_garbage_reply_falls_back() {
    let h = TestHarness::new().await;
    h.model_replies("Sure! Here is your record: TXT blog").await;

    let (translation, doc) = h
        .pipeline()
        .interpret("Create DNS record for blog.example.com")
        .await
        .unwrap();

    assert_eq!(translation.tier, "fallback");
    assert_eq!(doc.hostname(), "blog.example.com");
    let Operation::CreateDnsRecord { dns_record } = &doc.operation else {
        panic!("expected dns operation");
    };
    assert_eq!(dns_record.record_type, DnsRecordType::Txt);
    assert_eq!(dns_record.content, "managed-by-terrasmart");
    assert_eq!(dns_record.ttl, 300);
    assert!(!dns_record.proxied);
}

/// Unknown intent from the model counts as a parse failure.
#[tokio::test]
async fn e2e_unknown_intent_falls_back() {
    let h = TestHarness::new().await;
    h.model_replies(r#"{"intent": "create_pizza", "zone_name": "example.com", "hostname": "a.example.com"}"#)
        .await;

    let (translation, doc) = h
        .pipeline()
        .interpret("Add KV storage for cache.example.com")
        .await
        .unwrap();
    assert_eq!(translation.tier, "fallback");
    assert_eq!(doc.intent(), Intent::CreateKvNamespace);
    assert_eq!(doc.hostname(), "cache.example.com");
}

/// Fallback DNS output is pinned to the default zone too.
#[tokio::test]
async fn e2e_fallback_dns_pinned_to_default_zone() {
    let h = TestHarness::with_default_zone("mysite.dev").await;
    h.model_fails(503).await;

    let (_, doc) = h
        .pipeline()
        .interpret("Create DNS record for blog.example.com")
        .await
        .unwrap();
    assert_eq!(doc.zone_name(), "mysite.dev");
    assert_eq!(doc.hostname(), "blog.mysite.dev");
}

/// No API key: the rule-based tier renders a complete run directory.
#[tokio::test]
async fn e2e_offline_kv_run() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.defaults.account_id = Some("acc-offline".into());

    let out = tmp.path().join("kv");
    let run = Pipeline::from_config(&config)
        .unwrap()
        .prepare("Add KV storage for cache.example.com", Some(&out))
        .await
        .unwrap();

    assert_eq!(run.tier, "fallback");
    assert_eq!(run.fallback_reason.as_deref(), Some("no model configured"));
    assert!(read(&out, "main.tf").contains("cloudflare_workers_kv_namespace"));
    assert!(read(&out, "terraform.tfvars").contains("worker_name = \"cache-example-com\""));
}

/// Delete phrasing with a quoted value survives into the rendered lookup.
#[tokio::test]
async fn e2e_offline_delete_record() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.defaults.account_id = Some("acc-offline".into());
    config.defaults.zone = Some("example.com".into());

    let out = tmp.path().join("delete");
    let run = Pipeline::from_config(&config)
        .unwrap()
        .prepare(
            r#"borrar el registro TXT con contenido "Hello Mundo" en @"#,
            Some(&out),
        )
        .await
        .unwrap();

    assert_eq!(run.document.intent(), Intent::DeleteDnsRecord);
    assert_eq!(run.document.hostname(), "example.com");
    let main = read(&out, "main.tf");
    assert!(main.contains("import {"));
    assert!(main.contains("content  = \"Hello Mundo\""));
}
