//! On-demand CSV extract of verdicts, optionally filtered by disposition.

use crate::core::models::{Disposition, Verdict};

pub const CSV_HEADER: &str = "email,status,score,mail_host,signals";

/// Renders verdicts matching `filter` (all when `None`) as CSV with the
/// header row first.
pub fn to_csv(verdicts: &[Verdict], filter: Option<Disposition>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for verdict in verdicts {
        if filter.is_some_and(|wanted| verdict.disposition != wanted) {
            continue;
        }
        let signals = verdict
            .signals
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_field(&verdict.address),
            verdict.disposition,
            verdict.score,
            escape_field(&verdict.mail_exchange_host),
            escape_field(&signals),
        ));
    }
    out
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Signal, NO_MAIL_HOST};

    fn verdict(address: &str, disposition: Disposition, score: u8) -> Verdict {
        Verdict {
            address: address.to_string(),
            disposition,
            score,
            signals: vec![Signal::MailHostResolved, Signal::SmtpAccepted],
            mail_exchange_host: "mx.example.com".to_string(),
            smtp_code: Some(250),
            is_catch_all: false,
            completed_at: 0,
        }
    }

    #[test]
    fn filters_by_disposition() {
        let verdicts = vec![
            verdict("a@example.com", Disposition::Valid, 85),
            verdict("b@example.com", Disposition::Risky, 55),
        ];
        let csv = to_csv(&verdicts, Some(Disposition::Valid));
        assert!(csv.starts_with(CSV_HEADER));
        assert!(csv.contains("a@example.com,VALID,85"));
        assert!(!csv.contains("b@example.com"));
    }

    #[test]
    fn unfiltered_export_includes_everything() {
        let mut invalid = verdict("c@example.com", Disposition::Invalid, 2);
        invalid.mail_exchange_host = NO_MAIL_HOST.to_string();
        let verdicts = vec![verdict("a@example.com", Disposition::Valid, 85), invalid];
        let csv = to_csv(&verdicts, None);
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn signals_column_is_joined() {
        let verdicts = vec![verdict("a@example.com", Disposition::Valid, 85)];
        let csv = to_csv(&verdicts, None);
        assert!(csv.contains("mail host resolved; smtp accepted"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
