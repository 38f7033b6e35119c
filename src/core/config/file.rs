//! Defines the structure mirroring the TOML configuration file format.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) network: NetworkConfig,
    #[serde(default)]
    pub(crate) dns: DnsConfig,
    #[serde(default)]
    pub(crate) smtp: SmtpConfig,
    #[serde(default)]
    pub(crate) classifier: ClassifierConfig,
    #[serde(default)]
    pub(crate) scoring: ScoringConfig,
    #[serde(default)]
    pub(crate) engine: EngineConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct NetworkConfig {
    pub(crate) min_sleep: Option<f32>,
    pub(crate) max_sleep: Option<f32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsConfig {
    pub(crate) dns_timeout: Option<u64>,
    pub(crate) dns_servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpConfig {
    pub(crate) smtp_timeout: Option<u64>,
    pub(crate) smtp_port: Option<u16>,
    pub(crate) smtp_sender_email: Option<String>,
    pub(crate) smtp_helo_domain: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ClassifierConfig {
    pub(crate) role_prefixes: Option<Vec<String>>,
    pub(crate) disposable_domains: Option<Vec<String>>,
    pub(crate) typo_domains: Option<Vec<String>>,
    pub(crate) high_risk_tlds: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScoringConfig {
    pub(crate) base_score: Option<i16>,
    pub(crate) mx_bonus: Option<i16>,
    pub(crate) smtp_accept_bonus: Option<i16>,
    pub(crate) role_penalty: Option<i16>,
    pub(crate) catch_all_penalty: Option<i16>,
    pub(crate) transient_penalty: Option<i16>,
    pub(crate) inconclusive_penalty: Option<i16>,
    pub(crate) typo_penalty: Option<i16>,
    pub(crate) high_risk_tld_penalty: Option<i16>,
    pub(crate) floor_score: Option<u8>,
    pub(crate) hard_reject_codes: Option<Vec<u16>>,
    pub(crate) valid_threshold: Option<u8>,
    pub(crate) risky_threshold: Option<u8>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct EngineConfig {
    pub(crate) max_concurrency: Option<usize>,
}
