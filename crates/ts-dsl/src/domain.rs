//! Hostname and zone helpers shared by the interpreters, validator and renderer.

use std::sync::LazyLock;

use regex::Regex;

/// Zone used when nothing else is known.
pub const FALLBACK_ZONE: &str = "example.com";

/// Cloudflare's limit on worker script names.
pub const MAX_WORKER_NAME_LEN: usize = 63;

// Dot-separated labels: alphanumeric/hyphen, 1-63 chars, no edge hyphen.
static RE_FQDN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
        .unwrap()
});

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Case-insensitive FQDN syntax check.
pub fn is_valid_hostname(hostname: &str) -> bool {
    RE_FQDN.is_match(&hostname.to_ascii_lowercase())
}

/// FQDN syntax plus at least one dot.
pub fn is_valid_zone(zone: &str) -> bool {
    is_valid_hostname(zone) && zone.contains('.')
}

/// `YYYY-MM-DD` shape check (digits only, no calendar check).
pub fn is_valid_date(date: &str) -> bool {
    RE_DATE.is_match(date)
}

/// Last two labels of a hostname, or the whole hostname if it has fewer.
pub fn zone_from_hostname(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        hostname.to_string()
    }
}

/// Worker script name derived from a hostname: dots and underscores become
/// hyphens, capped at `MAX_WORKER_NAME_LEN` characters.
pub fn worker_name_from_hostname(hostname: &str) -> String {
    hostname
        .chars()
        .map(|c| if c == '.' || c == '_' { '-' } else { c })
        .take(MAX_WORKER_NAME_LEN)
        .collect()
}

/// First label of a hostname (`"foo"` for `"foo.other.com"`).
pub fn first_label(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}
