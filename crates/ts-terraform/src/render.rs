//! Terraform working-directory renderer.
//!
//! Turns a `ValidatedDocument` into `providers.tf`, `main.tf`,
//! `terraform.tfvars`, a `dsl.json` copy of the document and, for workers,
//! `src/worker.js`. Templates are embedded and rendered with handlebars in
//! strict mode; values are HCL-escaped before they reach a template, so HTML
//! escaping is off.

use std::path::{Path, PathBuf};

use chrono::Local;
use handlebars::Handlebars;
use serde_json::{Value, json};
use ts_dsl::domain::worker_name_from_hostname;
use ts_dsl::{Intent, Operation, RoutingMode, ValidatedDocument};

use crate::error::{RenderError, RenderResult};
use crate::runs::{DSL_FILE, new_run_dir};

const TEMPLATES: &[(&str, &str)] = &[
    ("providers", include_str!("../templates/providers.tf.hbs")),
    ("worker", include_str!("../templates/worker.tf.hbs")),
    ("dns_record", include_str!("../templates/dns_record.tf.hbs")),
    ("kv_namespace", include_str!("../templates/kv_namespace.tf.hbs")),
    ("d1_database", include_str!("../templates/d1_database.tf.hbs")),
    (
        "delete_dns_record",
        include_str!("../templates/delete_dns_record.tf.hbs"),
    ),
];

const WORKER_SCRIPT: &str = include_str!("../templates/worker.js");

/// Cloudflare's TTL value meaning "automatic", required for proxied records.
const AUTOMATIC_TTL: u32 = 1;

/// Compiled template registry.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> RenderResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, source)
                .map_err(|e| RenderError::Template(format!("{name}: {e}")))?;
        }

        Ok(Self { registry })
    }

    /// Write the Terraform files for `doc` and return the directory.
    ///
    /// Without `output_dir` a fresh `./terraform/<timestamp>` directory is
    /// used. Fails before touching the filesystem when no account id is
    /// available.
    pub fn render(
        &self,
        doc: &ValidatedDocument,
        account_id: Option<&str>,
        output_dir: Option<&Path>,
    ) -> RenderResult<PathBuf> {
        let account_id = account_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(RenderError::MissingAccountId)?;

        let work_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => new_run_dir(Path::new("."), Local::now()),
        };
        std::fs::create_dir_all(&work_dir).map_err(|e| RenderError::io(&work_dir, e))?;

        let ctx = template_context(doc);

        let providers = self.render_template("providers", &ctx)?;
        write_file(&work_dir.join("providers.tf"), &providers)?;

        let main = self.render_template(main_template(doc.intent()), &ctx)?;
        write_file(&work_dir.join("main.tf"), &main)?;

        write_file(&work_dir.join("terraform.tfvars"), &tfvars(doc, account_id))?;

        let dsl = serde_json::to_string_pretty(&doc.to_value())
            .map_err(|e| RenderError::Template(format!("dsl.json: {e}")))?;
        write_file(&work_dir.join(DSL_FILE), &format!("{dsl}\n"))?;

        if doc.intent() == Intent::CreateWorkerAndBindDomain {
            let src = work_dir.join("src");
            std::fs::create_dir_all(&src).map_err(|e| RenderError::io(&src, e))?;
            write_file(&src.join("worker.js"), WORKER_SCRIPT)?;
        }

        tracing::info!(
            dir = %work_dir.display(),
            intent = %doc.intent(),
            "rendered terraform files"
        );
        Ok(work_dir)
    }

    fn render_template(&self, name: &str, ctx: &Value) -> RenderResult<String> {
        self.registry
            .render(name, ctx)
            .map_err(|e| RenderError::Template(format!("{name}: {e}")))
    }
}

fn main_template(intent: Intent) -> &'static str {
    match intent {
        Intent::CreateWorkerAndBindDomain => "worker",
        Intent::CreateDnsRecord => "dns_record",
        Intent::CreateKvNamespace => "kv_namespace",
        Intent::CreateD1Database => "d1_database",
        Intent::DeleteDnsRecord => "delete_dns_record",
    }
}

/// Worker script name for the run: the document's worker name, or one
/// derived from the hostname for the other intents.
pub fn run_worker_name(doc: &ValidatedDocument) -> String {
    doc.worker()
        .map(|w| w.name.clone())
        .unwrap_or_else(|| worker_name_from_hostname(doc.hostname()))
}

fn template_context(doc: &ValidatedDocument) -> Value {
    let mut ctx = json!({ "intent": doc.intent().as_str() });

    match &doc.operation {
        Operation::CreateWorkerAndBindDomain {
            routing,
            worker,
            bindings,
        } => {
            let mode = routing.as_ref().map(|r| r.mode).unwrap_or_default();
            let bindings = bindings.clone().unwrap_or_default();
            ctx["worker"] = json!({
                "module": worker.module,
                "compatibility_date": hcl_escape(&worker.compatibility_date),
                "custom_domain": mode == RoutingMode::CustomDomain,
                "kv": bindings.kv.iter().map(|b| binding(b)).collect::<Vec<_>>(),
                "d1": bindings.d1.iter().map(|b| binding(b)).collect::<Vec<_>>(),
            });
        }
        Operation::CreateDnsRecord { dns_record } => {
            let ttl = if dns_record.proxied {
                AUTOMATIC_TTL
            } else {
                dns_record.ttl
            };
            ctx["record"] = json!({
                "type": dns_record.record_type.as_str(),
                "content": hcl_escape(&dns_record.content),
                "ttl": ttl,
                "proxied": dns_record.proxied,
            });
        }
        Operation::DeleteDnsRecord { dns_record } => {
            ctx["record"] = json!({
                "type": dns_record.record_type.as_str(),
                "has_content": dns_record.content.is_some(),
                "content": dns_record.content.as_deref().map(hcl_escape).unwrap_or_default(),
            });
        }
        Operation::CreateKvNamespace | Operation::CreateD1Database => {}
    }

    ctx
}

fn binding(name: &str) -> Value {
    json!({ "name": name, "resource": name.to_lowercase() })
}

fn tfvars(doc: &ValidatedDocument, account_id: &str) -> String {
    [
        ("zone_name", doc.zone_name().to_string()),
        ("hostname", doc.hostname().to_string()),
        ("worker_name", run_worker_name(doc)),
        ("account_id", account_id.to_string()),
    ]
    .iter()
    .map(|(key, value)| format!("{key} = \"{}\"\n", hcl_escape(value)))
    .collect()
}

/// Escape a value for use inside an HCL quoted string.
pub fn hcl_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn write_file(path: &Path, contents: &str) -> RenderResult<()> {
    std::fs::write(path, contents).map_err(|e| RenderError::io(path, e))
}
