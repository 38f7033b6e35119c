//! Builder for assembling a runtime [`Config`] from defaults, an optional
//! TOML file, and programmatic overrides, in that precedence order.

use super::file::ConfigFile;
use super::loading::load_config_file;
use super::validation::validate_config;
use super::Config;
use crate::core::error::Result;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<String>,
    min_sleep: Option<f32>,
    max_sleep: Option<f32>,
    dns_timeout: Option<u64>,
    dns_servers: Option<Vec<String>>,
    smtp_timeout: Option<u64>,
    smtp_port: Option<u16>,
    smtp_sender_email: Option<String>,
    smtp_helo_domain: Option<String>,
    max_concurrency: Option<usize>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit path to a TOML config file. When unset, default search
    /// locations are tried (see [`super::loading`]).
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_sleep_range(mut self, min: f32, max: f32) -> Self {
        self.min_sleep = Some(min);
        self.max_sleep = Some(max);
        self
    }

    pub fn with_dns_timeout(mut self, secs: u64) -> Self {
        self.dns_timeout = Some(secs);
        self
    }

    pub fn with_dns_servers(mut self, servers: Vec<String>) -> Self {
        self.dns_servers = Some(servers);
        self
    }

    pub fn with_smtp_timeout(mut self, secs: u64) -> Self {
        self.smtp_timeout = Some(secs);
        self
    }

    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = Some(port);
        self
    }

    pub fn with_smtp_sender_email(mut self, sender: impl Into<String>) -> Self {
        self.smtp_sender_email = Some(sender.into());
        self
    }

    pub fn with_smtp_helo_domain(mut self, helo: impl Into<String>) -> Self {
        self.smtp_helo_domain = Some(helo.into());
        self
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Resolves defaults, file settings, and overrides into a validated
    /// [`Config`].
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if let Some((file, path)) = load_config_file(self.config_path.as_deref())? {
            apply_config_file(&mut config, &file);
            config.loaded_config_path = Some(path);
            tracing::debug!(
                "Applied configuration file from {:?}",
                config.loaded_config_path
            );
        }

        if let Some(min) = self.min_sleep {
            config.sleep_between_requests.0 = min;
        }
        if let Some(max) = self.max_sleep {
            config.sleep_between_requests.1 = max;
        }
        if let Some(secs) = self.dns_timeout {
            config.dns_timeout = Duration::from_secs(secs);
        }
        if let Some(servers) = self.dns_servers {
            config.dns_servers = servers;
        }
        if let Some(secs) = self.smtp_timeout {
            config.smtp_timeout = Duration::from_secs(secs);
        }
        if let Some(port) = self.smtp_port {
            config.smtp_port = port;
        }
        if let Some(sender) = self.smtp_sender_email {
            config.smtp_sender_email = sender;
        }
        if let Some(helo) = self.smtp_helo_domain {
            config.smtp_helo_domain = helo;
        }
        if let Some(n) = self.max_concurrency {
            config.max_concurrency = n;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

fn apply_config_file(config: &mut Config, file: &ConfigFile) {
    if let Some(min) = file.network.min_sleep {
        config.sleep_between_requests.0 = min;
    }
    if let Some(max) = file.network.max_sleep {
        config.sleep_between_requests.1 = max;
    }

    if let Some(secs) = file.dns.dns_timeout {
        config.dns_timeout = Duration::from_secs(secs);
    }
    if let Some(ref servers) = file.dns.dns_servers {
        config.dns_servers = servers.clone();
    }

    if let Some(secs) = file.smtp.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(secs);
    }
    if let Some(port) = file.smtp.smtp_port {
        config.smtp_port = port;
    }
    if let Some(ref sender) = file.smtp.smtp_sender_email {
        config.smtp_sender_email = sender.clone();
    }
    if let Some(ref helo) = file.smtp.smtp_helo_domain {
        config.smtp_helo_domain = helo.clone();
    }

    if let Some(ref prefixes) = file.classifier.role_prefixes {
        config.role_prefixes = prefixes.iter().map(|s| s.to_lowercase()).collect();
    }
    if let Some(ref domains) = file.classifier.disposable_domains {
        config.disposable_domains = domains.iter().map(|s| s.to_lowercase()).collect();
    }
    if let Some(ref domains) = file.classifier.typo_domains {
        config.typo_domains = domains.iter().map(|s| s.to_lowercase()).collect();
    }
    if let Some(ref tlds) = file.classifier.high_risk_tlds {
        config.high_risk_tlds = tlds.iter().map(|s| s.to_lowercase()).collect();
    }

    let s = &mut config.scoring;
    let f = &file.scoring;
    if let Some(v) = f.base_score {
        s.base_score = v;
    }
    if let Some(v) = f.mx_bonus {
        s.mx_bonus = v;
    }
    if let Some(v) = f.smtp_accept_bonus {
        s.smtp_accept_bonus = v;
    }
    if let Some(v) = f.role_penalty {
        s.role_penalty = v;
    }
    if let Some(v) = f.catch_all_penalty {
        s.catch_all_penalty = v;
    }
    if let Some(v) = f.transient_penalty {
        s.transient_penalty = v;
    }
    if let Some(v) = f.inconclusive_penalty {
        s.inconclusive_penalty = v;
    }
    if let Some(v) = f.typo_penalty {
        s.typo_penalty = v;
    }
    if let Some(v) = f.high_risk_tld_penalty {
        s.high_risk_tld_penalty = v;
    }
    if let Some(v) = f.floor_score {
        s.floor_score = v;
    }
    if let Some(ref v) = f.hard_reject_codes {
        s.hard_reject_codes = v.clone();
    }
    if let Some(v) = f.valid_threshold {
        s.valid_threshold = v;
    }
    if let Some(v) = f.risky_threshold {
        s.risky_threshold = v;
    }

    if let Some(n) = file.engine.max_concurrency {
        config.max_concurrency = n;
    }
}
