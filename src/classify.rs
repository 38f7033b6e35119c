//! Pure, network-free address classification: syntax checks plus membership
//! lookups against the configured role/disposable/typo/high-risk sets.

use crate::core::config::Config;
use std::sync::Arc;

/// Maximum length of the local part per RFC 5321.
const MAX_LOCAL_PART_LEN: usize = 64;
/// Maximum length of a deliverable address (path limit minus brackets).
const MAX_ADDRESS_LEN: usize = 254;

/// Outcome of classifying one candidate address. Produced without any I/O
/// and never fails for unknown domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub syntax_ok: bool,
    pub local_part: String,
    pub domain: String,
    pub is_role_account: bool,
    pub is_disposable_domain: bool,
    pub is_known_typo_domain: bool,
    pub is_high_risk_tld: bool,
}

#[derive(Clone)]
pub struct Classifier {
    config: Arc<Config>,
}

impl Classifier {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Classifies a raw candidate string. The input is normalized (trimmed,
    /// lower-cased) before the local/domain split; the normalized parts are
    /// returned even when the syntax check fails, so callers can still log a
    /// meaningful address.
    pub fn classify(&self, raw: &str) -> Classification {
        let normalized = raw.trim().to_lowercase();

        let mut parts = normalized.splitn(2, '@');
        let local_part = parts.next().unwrap_or("").to_string();
        let domain = parts.next().unwrap_or("").to_string();

        let mut classification = Classification {
            syntax_ok: false,
            local_part: local_part.clone(),
            domain: domain.clone(),
            ..Classification::default()
        };

        if !self.syntax_ok(&normalized, &local_part, &domain) {
            tracing::trace!(target: "classify_task", "Rejected '{}' on syntax.", normalized);
            return classification;
        }
        classification.syntax_ok = true;

        classification.is_role_account = self.config.role_prefixes.contains(&local_part);
        classification.is_disposable_domain = self.config.disposable_domains.contains(&domain);
        classification.is_known_typo_domain = self.config.typo_domains.contains(&domain);
        classification.is_high_risk_tld = self
            .config
            .high_risk_tlds
            .iter()
            .any(|tld| domain.ends_with(tld.as_str()));

        classification
    }

    fn syntax_ok(&self, address: &str, local_part: &str, domain: &str) -> bool {
        if address.len() > MAX_ADDRESS_LEN {
            return false;
        }
        // Exactly one '@': the splitn(2) above leaves any second '@' inside
        // the domain half, so a single check here covers both zero and many.
        if local_part.is_empty() || domain.is_empty() || domain.contains('@') {
            return false;
        }
        if local_part.len() > MAX_LOCAL_PART_LEN {
            return false;
        }
        if !self.config.local_part_regex.is_match(local_part) {
            return false;
        }
        if local_part.starts_with('.') || local_part.ends_with('.') || local_part.contains("..") {
            return false;
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    }
}
