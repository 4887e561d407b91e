// Identifier and resource-name helpers

use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;

/// Kubernetes resource names (DNS-1123 subdomain label subset)
const MAX_NAME_LEN: usize = 63;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]+").expect("Invalid name regex"));

static DNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("Invalid namespace regex"));

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// New panel id: `panel-{millis}-{7 random base36 chars}`
pub fn generate_panel_id() -> String {
    format!("panel-{}-{}", Utc::now().timestamp_millis(), random_base36(7))
}

/// Resource name for a dashboard created without a title
pub fn generate_dashboard_name() -> String {
    format!("dashboard-{}", Utc::now().timestamp_millis())
}

/// Resource name derived from a user-supplied title
pub fn dashboard_name_from_title(title: &str) -> Result<String, String> {
    let lower = title.trim().to_lowercase();
    let slug = NON_NAME_CHARS.replace_all(&lower, "-");
    let mut name: String = slug.trim_matches('-').chars().take(MAX_NAME_LEN).collect();
    // Truncation can leave a trailing separator
    while name.ends_with('-') {
        name.pop();
    }

    if name.is_empty() {
        return Err(format!("'{}' does not contain any usable characters", title));
    }
    Ok(name)
}

/// Validate a namespace name
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("Namespace is required".to_string());
    }
    if namespace.len() > MAX_NAME_LEN {
        return Err(format!(
            "Namespace must be at most {} characters",
            MAX_NAME_LEN
        ));
    }
    if !DNS_LABEL.is_match(namespace) {
        return Err(format!(
            "Invalid namespace '{}': use lowercase letters, digits and '-'",
            namespace
        ));
    }
    Ok(())
}
