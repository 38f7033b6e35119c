//! Deterministic risk scoring: combines classifier and probe signals into a
//! bounded score and a disposition. All weights and thresholds live in one
//! parameterized policy rather than being re-derived at each call site.

use crate::classify::Classification;
use crate::core::models::{Disposition, Signal};
use crate::utils::smtp::result::{ProbeDisposition, ProbeReport};
use serde::{Deserialize, Serialize};

/// Transient record combining DNS and SMTP observations for one domain.
/// Consumed by the scorer and discarded after the verdict is emitted.
#[derive(Debug, Clone, Default)]
pub struct DomainProbeResult {
    /// Mail hosts in preference order; empty means unresolvable.
    pub resolved_hosts: Vec<String>,
    /// Present only when an SMTP probe was actually attempted.
    pub probe: Option<ProbeReport>,
}

/// Tunable weights and thresholds. Exposed as configuration; the defaults
/// form one internally consistent baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub base_score: i16,
    pub mx_bonus: i16,
    pub smtp_accept_bonus: i16,
    pub role_penalty: i16,
    pub catch_all_penalty: i16,
    pub transient_penalty: i16,
    pub inconclusive_penalty: i16,
    pub typo_penalty: i16,
    pub high_risk_tld_penalty: i16,
    /// Near-zero score assigned by the hard-floor rules.
    pub floor_score: u8,
    /// Reply codes treated as a permanent recipient rejection.
    pub hard_reject_codes: Vec<u16>,
    pub valid_threshold: u8,
    pub risky_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_score: 50,
            mx_bonus: 15,
            smtp_accept_bonus: 20,
            role_penalty: 20,
            catch_all_penalty: 30,
            transient_penalty: 15,
            inconclusive_penalty: 10,
            typo_penalty: 25,
            high_risk_tld_penalty: 10,
            floor_score: 2,
            hard_reject_codes: vec![550, 551, 553, 554],
            valid_threshold: 70,
            risky_threshold: 30,
        }
    }
}

/// Score, disposition, and the ordered list of rules that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    pub score: u8,
    pub disposition: Disposition,
    pub signals: Vec<Signal>,
}

impl ScoringPolicy {
    /// Combines classification and probe evidence into a final score.
    /// Side-effect free and deterministic given identical inputs.
    pub fn score(&self, classification: &Classification, probe: &DomainProbeResult) -> Scored {
        if !classification.syntax_ok {
            return self.floored(Signal::MalformedAddress);
        }
        if classification.is_disposable_domain {
            return self.floored(Signal::DisposableDomain);
        }
        if probe.resolved_hosts.is_empty() {
            return self.floored(Signal::NoMailHost);
        }
        if let Some(report) = &probe.probe {
            if let ProbeDisposition::PermanentReject(code) = report.primary {
                if self.hard_reject_codes.contains(&code) {
                    return self.floored(Signal::SmtpPermanentReject);
                }
            }
        }

        let mut score = self.base_score;
        let mut signals = Vec::new();

        score += self.mx_bonus;
        signals.push(Signal::MailHostResolved);

        if let Some(report) = &probe.probe {
            match &report.primary {
                ProbeDisposition::Accepted(_) => {
                    score += self.smtp_accept_bonus;
                    signals.push(Signal::SmtpAccepted);
                }
                ProbeDisposition::TransientReject(_) => {
                    score -= self.transient_penalty;
                    signals.push(Signal::SmtpTransientReject);
                }
                // Non-fatal 5xx (e.g. 552 over-quota) is weighted like a
                // transient failure rather than flooring the score.
                ProbeDisposition::PermanentReject(_) => {
                    score -= self.transient_penalty;
                    signals.push(Signal::SmtpPermanentReject);
                }
                ProbeDisposition::Inconclusive(_) => {
                    score -= self.inconclusive_penalty;
                    signals.push(Signal::ProbeInconclusive);
                }
            }
            if report.is_catch_all {
                score -= self.catch_all_penalty;
                signals.push(Signal::CatchAllDomain);
            }
        } else {
            // Hosts resolved but no probe ran (e.g. worker fault recovery).
            score -= self.inconclusive_penalty;
            signals.push(Signal::ProbeInconclusive);
        }

        if classification.is_role_account {
            score -= self.role_penalty;
            signals.push(Signal::RoleAccount);
        }
        if classification.is_known_typo_domain {
            score -= self.typo_penalty;
            signals.push(Signal::TypoDomain);
        }
        if classification.is_high_risk_tld {
            score -= self.high_risk_tld_penalty;
            signals.push(Signal::HighRiskTld);
        }

        let score = score.clamp(0, 100) as u8;
        Scored {
            score,
            disposition: self.disposition_for(score),
            signals,
        }
    }

    fn floored(&self, signal: Signal) -> Scored {
        Scored {
            score: self.floor_score,
            disposition: Disposition::Invalid,
            signals: vec![signal],
        }
    }

    /// Maps a clamped score onto the configured threshold bands.
    pub fn disposition_for(&self, score: u8) -> Disposition {
        if score >= self.valid_threshold {
            Disposition::Valid
        } else if score >= self.risky_threshold {
            Disposition::Risky
        } else {
            Disposition::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::smtp::result::ProbeReport;

    fn ok_classification() -> Classification {
        Classification {
            syntax_ok: true,
            local_part: "john".to_string(),
            domain: "example.com".to_string(),
            ..Classification::default()
        }
    }

    fn probe_with(code: u16, is_catch_all: bool) -> DomainProbeResult {
        DomainProbeResult {
            resolved_hosts: vec!["mx.example.com".to_string()],
            probe: Some(ProbeReport::from_code(code, is_catch_all)),
        }
    }

    #[test]
    fn accepted_non_catch_all_is_valid() {
        let scored = ScoringPolicy::default().score(&ok_classification(), &probe_with(250, false));
        assert_eq!(scored.score, 85);
        assert_eq!(scored.disposition, Disposition::Valid);
        assert_eq!(
            scored.signals,
            vec![Signal::MailHostResolved, Signal::SmtpAccepted]
        );
    }

    #[test]
    fn catch_all_downgrades_to_risky() {
        let policy = ScoringPolicy::default();
        let clean = policy.score(&ok_classification(), &probe_with(250, false));
        let catch_all = policy.score(&ok_classification(), &probe_with(250, true));
        assert_eq!(catch_all.disposition, Disposition::Risky);
        assert!(catch_all.score < clean.score);
        assert!(catch_all.signals.contains(&Signal::CatchAllDomain));
    }

    #[test]
    fn role_account_lands_in_risky_band() {
        let mut classification = ok_classification();
        classification.is_role_account = true;
        let scored = ScoringPolicy::default().score(&classification, &probe_with(250, false));
        assert_eq!(scored.disposition, Disposition::Risky);
        assert!(scored.signals.contains(&Signal::RoleAccount));
    }

    #[test]
    fn malformed_address_floors_without_other_signals() {
        let classification = Classification::default();
        let scored =
            ScoringPolicy::default().score(&classification, &DomainProbeResult::default());
        assert_eq!(scored.disposition, Disposition::Invalid);
        assert_eq!(scored.signals, vec![Signal::MalformedAddress]);
    }

    #[test]
    fn unresolvable_domain_floors() {
        let scored =
            ScoringPolicy::default().score(&ok_classification(), &DomainProbeResult::default());
        assert_eq!(scored.disposition, Disposition::Invalid);
        assert_eq!(scored.signals, vec![Signal::NoMailHost]);
    }

    #[test]
    fn disposable_domain_floors_before_dns_evidence() {
        let mut classification = ok_classification();
        classification.is_disposable_domain = true;
        let scored = ScoringPolicy::default().score(&classification, &probe_with(250, false));
        assert_eq!(scored.disposition, Disposition::Invalid);
        assert_eq!(scored.signals, vec![Signal::DisposableDomain]);
    }

    #[test]
    fn hard_reject_code_overrides_positive_signals() {
        let scored = ScoringPolicy::default().score(&ok_classification(), &probe_with(550, false));
        assert_eq!(scored.disposition, Disposition::Invalid);
        assert_eq!(scored.score, ScoringPolicy::default().floor_score);
        assert_eq!(scored.signals, vec![Signal::SmtpPermanentReject]);
    }

    #[test]
    fn greylisting_is_a_soft_penalty() {
        let scored = ScoringPolicy::default().score(&ok_classification(), &probe_with(451, false));
        assert_eq!(scored.score, 50);
        assert_eq!(scored.disposition, Disposition::Risky);
        assert!(scored.signals.contains(&Signal::SmtpTransientReject));
    }

    #[test]
    fn inconclusive_probe_reduces_confidence() {
        let probe = DomainProbeResult {
            resolved_hosts: vec!["mx.example.com".to_string()],
            probe: Some(ProbeReport::inconclusive("timed out")),
        };
        let scored = ScoringPolicy::default().score(&ok_classification(), &probe);
        assert_eq!(scored.score, 55);
        assert_eq!(scored.disposition, Disposition::Risky);
    }

    #[test]
    fn scoring_is_deterministic() {
        let policy = ScoringPolicy::default();
        let a = policy.score(&ok_classification(), &probe_with(250, true));
        let b = policy.score(&ok_classification(), &probe_with(250, true));
        assert_eq!(a, b);
    }

    #[test]
    fn scores_stay_in_bounds_under_extreme_weights() {
        let policy = ScoringPolicy {
            smtp_accept_bonus: 500,
            ..ScoringPolicy::default()
        };
        let scored = policy.score(&ok_classification(), &probe_with(250, false));
        assert_eq!(scored.score, 100);

        let policy = ScoringPolicy {
            catch_all_penalty: 500,
            ..ScoringPolicy::default()
        };
        let scored = policy.score(&ok_classification(), &probe_with(250, true));
        assert_eq!(scored.score, 0);
    }
}
