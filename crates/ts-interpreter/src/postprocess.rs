//! Default-zone reconciliation applied to every interpreted document.

use ts_dsl::DslDocument;
use ts_dsl::document::ROOT_MARKER;
use ts_dsl::domain::{FALLBACK_ZONE, first_label};

/// Rewrites zone and hostname so they agree with the configured default zone.
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    default_zone: Option<String>,
}

impl PostProcessor {
    pub fn new(default_zone: Option<String>) -> Self {
        Self { default_zone }
    }

    /// Consume and return the reconciled document.
    pub fn process(&self, mut doc: DslDocument) -> DslDocument {
        self.apply(&mut doc);
        doc
    }

    /// Reconcile in place. Never fails.
    pub fn apply(&self, doc: &mut DslDocument) {
        let is_dns = doc.intent().is_dns();

        if doc.zone_name.as_deref() == Some(ROOT_MARKER) {
            doc.zone_name = Some(
                self.default_zone
                    .clone()
                    .unwrap_or_else(|| FALLBACK_ZONE.to_string()),
            );
        }

        if is_dns && doc.hostname.is_none() {
            doc.hostname = doc.zone_name.clone();
        }

        if doc.zone_name.is_none() {
            doc.zone_name = self.default_zone.clone();
        }

        if is_dns && let Some(zone) = &self.default_zone {
            doc.zone_name = Some(zone.clone());
            doc.hostname = Some(pin_to_zone(doc.hostname.as_deref(), zone));
        }

        if doc.hostname.as_deref() == Some(ROOT_MARKER) {
            doc.hostname = doc.zone_name.clone();
        }
    }
}

/// Hostname forced under `zone`: root records become the zone itself,
/// foreign multi-label names keep only their first label.
fn pin_to_zone(hostname: Option<&str>, zone: &str) -> String {
    match hostname {
        None => zone.to_string(),
        Some(h) if h == ROOT_MARKER || h == zone => zone.to_string(),
        Some(h) if h.ends_with(&format!(".{zone}")) => h.to_string(),
        Some(h) if h.contains('.') => format!("{}.{zone}", first_label(h)),
        Some(h) => h.to_string(),
    }
}
