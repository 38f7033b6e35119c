//! Mail-exchange host resolution for candidate domains.
//!
//! Resolution failure is a normal outcome here: an empty host list means
//! "undeliverable domain" and is never surfaced as an error to the caller.

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Seam for dependency injection: the engine only depends on this trait, so
/// tests drive it with canned host lists instead of live DNS.
pub trait MailHostResolver: Send + Sync + 'static {
    /// Resolves deliverable mail hosts for `domain`, best first. An empty
    /// vector means the domain cannot receive mail.
    fn resolve_mail_hosts(&self, domain: &str) -> impl Future<Output = Vec<String>> + Send;
}

/// Production resolver backed by trust-dns against the configured servers.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new(config: &Config) -> Result<Self> {
        let mut resolver_config = ResolverConfig::new();
        for server in &config.dns_servers {
            let ip: IpAddr = server.parse().map_err(|e| {
                AppError::Initialization(format!("Invalid DNS server address '{}': {}", server, e))
            })?;
            resolver_config.add_name_server(NameServerConfig::new(
                SocketAddr::new(ip, 53),
                Protocol::Udp,
            ));
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = config.dns_timeout;
        opts.attempts = 2;

        tracing::debug!(target: "dns_task",
            "Initializing DNS resolver with {} server(s), timeout {:?}",
            config.dns_servers.len(), config.dns_timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }

    /// Convenience constructor for callers that already hold an `Arc<Config>`.
    pub fn from_config(config: &Arc<Config>) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(config)?))
    }
}

impl MailHostResolver for DnsResolver {
    async fn resolve_mail_hosts(&self, domain: &str) -> Vec<String> {
        match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let pairs: Vec<(u16, String)> = lookup
                    .iter()
                    .map(|mx| {
                        (
                            mx.preference(),
                            mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        )
                    })
                    .collect();
                if !pairs.is_empty() {
                    let hosts = sort_mail_hosts(pairs);
                    tracing::debug!(target: "dns_task",
                        "Resolved {} MX host(s) for {}: first is {}",
                        hosts.len(), domain, hosts[0]);
                    return hosts;
                }
                tracing::debug!(target: "dns_task", "No MX records for {}; trying A fallback.", domain);
            }
            Err(e) => {
                tracing::debug!(target: "dns_task",
                    "MX lookup failed for {} ({}); trying A fallback.", domain, e);
            }
        }

        // RFC 5321 implicit MX: a domain with an address record but no MX
        // records receives mail at the domain itself.
        match self.resolver.ipv4_lookup(domain).await {
            Ok(lookup) if lookup.iter().next().is_some() => {
                tracing::debug!(target: "dns_task",
                    "Domain {} has an A record; using it as the sole mail host.", domain);
                vec![domain.to_string()]
            }
            Ok(_) => {
                tracing::debug!(target: "dns_task", "Domain {} has no A records.", domain);
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(target: "dns_task",
                    "A lookup failed for {}: {}. Treating as unresolvable.", domain, e);
                Vec::new()
            }
        }
    }
}

/// Sorts MX candidates by ascending preference, ties broken by hostname
/// lexical order so results are deterministic across runs.
pub(crate) fn sort_mail_hosts(mut pairs: Vec<(u16, String)>) -> Vec<String> {
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    pairs.into_iter().map(|(_, host)| host).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_preference_then_hostname() {
        let hosts = sort_mail_hosts(vec![
            (20, "backup.example.com".to_string()),
            (10, "beta.example.com".to_string()),
            (10, "alpha.example.com".to_string()),
        ]);
        assert_eq!(
            hosts,
            vec!["alpha.example.com", "beta.example.com", "backup.example.com"]
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(sort_mail_hosts(Vec::new()).is_empty());
    }
}
