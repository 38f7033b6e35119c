//! Defines the result types for SMTP recipient probes.

/// Synthetic code recorded when the server never produced a reply
/// (connection refused, handshake failure, timeout).
pub const NO_REPLY_CODE: u16 = 0;

/// Classified outcome of one RCPT TO probe. Transport-level failures are
/// downgraded to `Inconclusive` so the scorer can weight them instead of the
/// whole run erroring out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeDisposition {
    /// Server accepted the recipient (2xx).
    Accepted(u16),
    /// Temporary refusal, typically greylisting (4xx).
    TransientReject(u16),
    /// Permanent refusal (5xx).
    PermanentReject(u16),
    /// No usable reply: refused connection, handshake failure, or timeout.
    Inconclusive(String),
}

impl ProbeDisposition {
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => ProbeDisposition::Accepted(code),
            400..=499 => ProbeDisposition::TransientReject(code),
            500..=599 => ProbeDisposition::PermanentReject(code),
            other => ProbeDisposition::Inconclusive(format!("unexpected reply code {}", other)),
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ProbeDisposition::Accepted(c)
            | ProbeDisposition::TransientReject(c)
            | ProbeDisposition::PermanentReject(c) => Some(*c),
            ProbeDisposition::Inconclusive(_) => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ProbeDisposition::Accepted(_))
    }
}

/// Outcome of probing one candidate plus the catch-all companion probe
/// against the same domain.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Outcome of the primary RCPT TO for the candidate address.
    pub primary: ProbeDisposition,
    /// Raw reply code for the primary probe; [`NO_REPLY_CODE`] when the
    /// server never answered.
    pub smtp_code: u16,
    /// True when a randomized, certainly-nonexistent local part on the same
    /// domain was also accepted, making the primary acceptance untrustworthy.
    pub is_catch_all: bool,
}

impl ProbeReport {
    /// Builds a report from the raw primary reply code.
    pub fn from_code(code: u16, is_catch_all: bool) -> Self {
        Self {
            primary: ProbeDisposition::from_code(code),
            smtp_code: code,
            is_catch_all,
        }
    }

    /// A probe that never got a usable server reply.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Self {
            primary: ProbeDisposition::Inconclusive(reason.into()),
            smtp_code: NO_REPLY_CODE,
            is_catch_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_dispositions() {
        assert_eq!(ProbeDisposition::from_code(250), ProbeDisposition::Accepted(250));
        assert_eq!(
            ProbeDisposition::from_code(451),
            ProbeDisposition::TransientReject(451)
        );
        assert_eq!(
            ProbeDisposition::from_code(550),
            ProbeDisposition::PermanentReject(550)
        );
        assert!(matches!(
            ProbeDisposition::from_code(0),
            ProbeDisposition::Inconclusive(_)
        ));
    }

    #[test]
    fn inconclusive_report_has_no_reply_code() {
        let report = ProbeReport::inconclusive("connection refused");
        assert_eq!(report.smtp_code, NO_REPLY_CODE);
        assert!(!report.is_catch_all);
        assert!(report.primary.code().is_none());
    }
}
