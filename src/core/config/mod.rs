//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::scoring::ScoringPolicy;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;

/// Runtime configuration settings used by the email-warden core logic.
#[derive(Clone)]
pub struct Config {
    /// Per-worker randomized pacing range (seconds) between tasks. This is
    /// the engine's sole backpressure mechanism against target mail
    /// infrastructure; removing it makes the tool look abusive.
    pub sleep_between_requests: (f32, f32),

    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,

    pub smtp_timeout: Duration,
    pub smtp_port: u16,
    pub smtp_sender_email: String,
    pub smtp_helo_domain: String,

    pub role_prefixes: HashSet<String>,
    pub disposable_domains: HashSet<String>,
    pub typo_domains: HashSet<String>,
    pub high_risk_tlds: Vec<String>,
    pub local_part_regex: Regex,

    pub max_concurrency: usize,
    pub scoring: ScoringPolicy,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let role_prefixes: HashSet<String> = [
            "admin",
            "info",
            "support",
            "sales",
            "contact",
            "help",
            "career",
            "careers",
            "billing",
            "accounts",
            "abuse",
            "postmaster",
            "hr",
            "no-reply",
            "noreply",
            "webmaster",
            "office",
            "hello",
            "marketing",
            "security",
            "jobs",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let disposable_domains: HashSet<String> = [
            "mailinator.com",
            "tempmail.com",
            "temp-mail.org",
            "10minutemail.com",
            "guerrillamail.com",
            "yopmail.com",
            "sharklasers.com",
            "getnada.com",
            "trashmail.com",
            "dispostable.com",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let typo_domains: HashSet<String> = [
            "gmial.com",
            "gmal.com",
            "gamil.com",
            "gmai.com",
            "gnail.com",
            "hotmial.com",
            "hotmal.com",
            "yaho.com",
            "yahooo.com",
            "outlok.com",
            "iclould.com",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let high_risk_tlds = [".xyz", ".top", ".click", ".loan", ".work", ".gq", ".tk", ".ml"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        // RFC-inspired atom characters permitted in an unquoted local part.
        let local_part_regex = Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+$")
            .expect("Default local-part regex failed to compile. This is a bug.");

        let dns_servers = vec![
            "8.8.8.8".to_string(),
            "8.8.4.4".to_string(),
            "1.1.1.1".to_string(),
            "1.0.0.1".to_string(),
        ];

        Config {
            sleep_between_requests: (0.2, 0.6),
            dns_timeout: Duration::from_secs(5),
            dns_servers,
            smtp_timeout: Duration::from_secs(10),
            smtp_port: 25,
            smtp_sender_email: "verify-probe@example.com".to_string(),
            smtp_helo_domain: "localhost".to_string(),
            role_prefixes,
            disposable_domains,
            typo_domains,
            high_risk_tlds,
            local_part_regex,
            max_concurrency: std::thread::available_parallelism()
                .map_or(4, |n| n.get())
                .max(1),
            scoring: ScoringPolicy::default(),
            loaded_config_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("sleep_between_requests", &self.sleep_between_requests)
            .field("dns_timeout", &self.dns_timeout)
            .field("dns_servers_count", &self.dns_servers.len())
            .field("smtp_timeout", &self.smtp_timeout)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_sender_email", &self.smtp_sender_email)
            .field("smtp_helo_domain", &self.smtp_helo_domain)
            .field("role_prefixes_count", &self.role_prefixes.len())
            .field("disposable_domains_count", &self.disposable_domains.len())
            .field("typo_domains_count", &self.typo_domains.len())
            .field("high_risk_tlds", &self.high_risk_tlds)
            .field("local_part_regex", &self.local_part_regex.as_str())
            .field("max_concurrency", &self.max_concurrency)
            .field("scoring", &self.scoring)
            .field("loaded_config_path", &self.loaded_config_path)
            .finish()
    }
}

/// Utility function to get a random sleep duration based on [`Config`].
///
/// Uses the `sleep_between_requests` setting from the provided configuration.
pub fn get_random_sleep_duration(config: &Config) -> Duration {
    use rand::Rng;
    let (min, max) = config.sleep_between_requests;
    if min >= max {
        return Duration::from_secs_f32(min.max(0.0));
    }
    let duration_secs = rand::thread_rng().gen_range(min..max);
    Duration::from_secs_f32(duration_secs)
}
