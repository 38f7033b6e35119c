//! Provides the SmtpProber for checking recipient acceptance via a transient
//! SMTP session: CONNECT, EHLO, MAIL FROM, RCPT TO, then a second RCPT TO for
//! a randomized address to detect catch-all servers. Never issues DATA.

use super::result::ProbeReport;
use crate::core::config::Config;

use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Ehlo, Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use lettre::Address;
use rand::Rng;
use std::future::Future;
use std::net::ToSocketAddrs;
use std::str::FromStr;
use std::sync::Arc;

/// Seam for dependency injection: tests implement this with canned reply
/// codes instead of opening real connections.
pub trait RecipientProber: Send + Sync + 'static {
    /// Probes `address` against `host`. Transport failures surface as an
    /// inconclusive report, never as an error.
    fn probe(&self, host: &str, address: &str) -> impl Future<Output = ProbeReport> + Send;
}

/// Production prober speaking plaintext SMTP on the configured port.
#[derive(Clone)]
pub struct SmtpProber {
    config: Arc<Config>,
}

impl SmtpProber {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn run_session(&self, host: &str, address: &str) -> ProbeReport {
        let recipient = match Address::from_str(address) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(target: "smtp_task", "Recipient '{}' not representable: {}", address, e);
                return ProbeReport::inconclusive(format!("unparseable recipient: {}", e));
            }
        };
        let sender = match Address::from_str(&self.config.smtp_sender_email) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(target: "smtp_task", "Configured sender is invalid: {}", e);
                return ProbeReport::inconclusive(format!("invalid sender identity: {}", e));
            }
        };

        let socket_addr = match (host, self.config.smtp_port).to_socket_addrs() {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    return ProbeReport::inconclusive(format!("no address for host {}", host));
                }
            },
            Err(e) => {
                tracing::debug!(target: "smtp_task", "Could not resolve {}: {}", host, e);
                return ProbeReport::inconclusive(format!("host resolution failed: {}", e));
            }
        };

        let helo_name = ClientId::Domain(self.config.smtp_helo_domain.clone());
        let mut conn = match SmtpConnection::connect(
            socket_addr,
            Some(self.config.smtp_timeout),
            &helo_name,
            None,
            None,
        ) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(target: "smtp_task",
                    "Connection to {} ({}) failed: {}", host, socket_addr, e);
                return ProbeReport::inconclusive(format!("connect failed: {}", e));
            }
        };
        tracing::trace!(target: "smtp_task", "Connected to {}:{}", host, socket_addr.port());

        if let Err(e) = conn.command(Ehlo::new(helo_name.clone())) {
            tracing::debug!(target: "smtp_task", "EHLO rejected by {}: {}", host, e);
            conn.quit().ok();
            return ProbeReport::inconclusive(format!("EHLO failed: {}", e));
        }

        if let Err(e) = conn.command(Mail::new(Some(sender), vec![])) {
            tracing::debug!(target: "smtp_task", "MAIL FROM rejected by {}: {}", host, e);
            conn.quit().ok();
            return ProbeReport::inconclusive(format!("MAIL FROM failed: {}", e));
        }

        tracing::trace!(target: "smtp_task", "RCPT TO:<{}> via {}", address, host);
        let primary_code = match conn.command(Rcpt::new(recipient, vec![])) {
            Ok(response) => parse_reply_code(&response.code().to_string()),
            Err(e) => {
                // lettre surfaces negative replies as errors; salvage the
                // reply code from the message when one is present.
                match code_from_smtp_error(&e) {
                    Some(code) => code,
                    None => {
                        tracing::debug!(target: "smtp_task",
                            "RCPT TO for <{}> on {} got no usable reply: {}", address, host, e);
                        conn.quit().ok();
                        return ProbeReport::inconclusive(format!("RCPT failed: {}", e));
                    }
                }
            }
        };
        tracing::debug!(target: "smtp_task",
            "RCPT TO:<{}> answered {} by {}", address, primary_code, host);

        // The catch-all companion probe only matters when the primary
        // recipient was accepted; a rejection is already informative.
        let is_catch_all = if (200..300).contains(&primary_code) {
            let domain = address.split('@').nth(1).unwrap_or_default();
            self.catch_all_probe(&mut conn, host, domain)
        } else {
            false
        };

        conn.quit().ok();
        ProbeReport::from_code(primary_code, is_catch_all)
    }

    /// Issues a second RCPT TO in the same session for a randomized local
    /// part that is virtually certain not to exist. Acceptance means the
    /// server is permissive and the primary acceptance proves nothing.
    fn catch_all_probe(&self, conn: &mut SmtpConnection, host: &str, domain: &str) -> bool {
        let random_user = format!(
            "vrfy-absent-{}-{:x}@{}",
            rand::thread_rng().gen_range(10000..99999),
            rand::thread_rng().gen::<u32>(),
            domain
        );
        let random_address = match Address::from_str(&random_user) {
            Ok(addr) => addr,
            Err(_) => {
                tracing::warn!(target: "smtp_task",
                    "Generated catch-all address '{}' failed to parse.", random_user);
                return false;
            }
        };

        tracing::trace!(target: "smtp_task", "Catch-all RCPT TO:<{}> via {}", random_user, host);
        match conn.command(Rcpt::new(random_address, vec![])) {
            Ok(response) => {
                let code = parse_reply_code(&response.code().to_string());
                if (200..300).contains(&code) {
                    tracing::info!(target: "smtp_task",
                        "Domain {} (host {}) accepted random user with {}; flagging catch-all.",
                        domain, host, code);
                    true
                } else {
                    tracing::trace!(target: "smtp_task",
                        "Catch-all probe rejected with {} on {}.", code, host);
                    false
                }
            }
            Err(e) => {
                tracing::debug!(target: "smtp_task",
                    "Catch-all RCPT error on {} (treated as not catch-all): {}", host, e);
                false
            }
        }
    }
}

impl RecipientProber for SmtpProber {
    async fn probe(&self, host: &str, address: &str) -> ProbeReport {
        let prober = self.clone();
        let host = host.to_string();
        let address = address.to_string();
        // lettre's SmtpConnection is synchronous; keep it off the async
        // workers so probes don't stall the runtime.
        match tokio::task::spawn_blocking(move || prober.run_session(&host, &address)).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(target: "smtp_task", "Probe task failed: {}", e);
                ProbeReport::inconclusive(format!("probe task failed: {}", e))
            }
        }
    }
}

fn parse_reply_code(code: &str) -> u16 {
    code.trim().parse::<u16>().unwrap_or(0)
}

/// Scans an SMTP transport error message for an embedded reply code
/// (lettre reports negative completions as errors with the code inlined).
fn code_from_smtp_error(error: &lettre::transport::smtp::Error) -> Option<u16> {
    let message = error.to_string();
    message
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|token| token.parse::<u16>().ok())
        .find(|code| (200..=599).contains(code) && token_is_reply_code(*code))
}

fn token_is_reply_code(code: u16) -> bool {
    matches!(code / 100, 2 | 4 | 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_code_parsing_tolerates_noise() {
        assert_eq!(parse_reply_code("250"), 250);
        assert_eq!(parse_reply_code(" 550 "), 550);
        assert_eq!(parse_reply_code("not-a-code"), 0);
    }

    #[test]
    fn reply_code_class_filter() {
        assert!(token_is_reply_code(250));
        assert!(token_is_reply_code(451));
        assert!(token_is_reply_code(550));
        assert!(!token_is_reply_code(301));
    }
}
