//! Core data types shared across the verification engine: verdicts,
//! dispositions, explanation signals, and run-level aggregate counters.

use serde::{Deserialize, Serialize};

/// Final three-way classification derived from the numeric risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Disposition {
    Valid,
    Risky,
    Invalid,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Valid => write!(f, "VALID"),
            Disposition::Risky => write!(f, "RISKY"),
            Disposition::Invalid => write!(f, "INVALID"),
        }
    }
}

/// A named reason that contributed to the final score, recorded in
/// evaluation order so every verdict is explainable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    MalformedAddress,
    NoMailHost,
    DisposableDomain,
    SmtpPermanentReject,
    MailHostResolved,
    SmtpAccepted,
    RoleAccount,
    CatchAllDomain,
    SmtpTransientReject,
    ProbeInconclusive,
    TypoDomain,
    HighRiskTld,
    WorkerFault,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::MalformedAddress => "malformed address",
            Signal::NoMailHost => "no resolvable mail host",
            Signal::DisposableDomain => "disposable domain",
            Signal::SmtpPermanentReject => "smtp permanent reject",
            Signal::MailHostResolved => "mail host resolved",
            Signal::SmtpAccepted => "smtp accepted",
            Signal::RoleAccount => "role account",
            Signal::CatchAllDomain => "catch-all domain",
            Signal::SmtpTransientReject => "smtp transient reject",
            Signal::ProbeInconclusive => "probe inconclusive",
            Signal::TypoDomain => "likely typo domain",
            Signal::HighRiskTld => "high-risk tld",
            Signal::WorkerFault => "worker fault",
        }
    }
}

/// Sentinel used in place of a mail exchange host when resolution failed.
pub const NO_MAIL_HOST: &str = "-";

/// The unit of output: one immutable, fully explained result per accepted
/// candidate address. Never retro-corrected once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// The normalized (trimmed, lower-cased) input address.
    pub address: String,
    pub disposition: Disposition,
    /// Bounded risk score in [0, 100]; higher means more deliverable.
    pub score: u8,
    /// Every scoring rule that fired, in evaluation order.
    pub signals: Vec<Signal>,
    /// Resolved primary mail exchange host, or [`NO_MAIL_HOST`].
    pub mail_exchange_host: String,
    /// Raw SMTP reply code for the primary probe, if one ran.
    pub smtp_code: Option<u16>,
    pub is_catch_all: bool,
    /// Logical sequence position in the run's completion order.
    pub completed_at: u64,
}

/// Mutable aggregate counters for one verification run. Owned by the
/// dispatcher; external readers only ever see snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: u64,
    pub completed: u64,
    pub valid: u64,
    pub risky: u64,
    pub invalid: u64,
}

impl RunStats {
    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Incremental event feed delivered to streaming consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Result(Verdict),
    Progress(RunStats),
}
