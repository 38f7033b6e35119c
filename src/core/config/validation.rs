//! Sanity checks applied to a fully assembled [`Config`].

use super::Config;
use crate::core::error::{AppError, Result};

pub(crate) fn validate_config(config: &Config) -> Result<()> {
    let (min, max) = config.sleep_between_requests;
    if min < 0.0 || max < 0.0 {
        return Err(AppError::Config(
            "Sleep range values must be non-negative.".to_string(),
        ));
    }
    if min > max {
        return Err(AppError::Config(format!(
            "Invalid sleep range: min ({}) exceeds max ({}).",
            min, max
        )));
    }

    if config.dns_servers.is_empty() {
        return Err(AppError::Config(
            "At least one DNS server must be configured.".to_string(),
        ));
    }

    if !config.smtp_sender_email.contains('@') {
        return Err(AppError::Config(format!(
            "SMTP sender email '{}' is not a plausible address.",
            config.smtp_sender_email
        )));
    }

    if config.max_concurrency == 0 {
        return Err(AppError::Config(
            "max_concurrency must be at least 1.".to_string(),
        ));
    }

    let s = &config.scoring;
    if s.risky_threshold >= s.valid_threshold {
        return Err(AppError::Config(format!(
            "Scoring thresholds out of order: risky ({}) must be below valid ({}).",
            s.risky_threshold, s.valid_threshold
        )));
    }
    if s.valid_threshold > 100 {
        return Err(AppError::Config(
            "valid_threshold cannot exceed 100.".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn inverted_sleep_range_is_rejected() {
        let mut config = Config::default();
        config.sleep_between_requests = (2.0, 0.5);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut config = Config::default();
        config.scoring.risky_threshold = 80;
        config.scoring.valid_threshold = 70;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = Config::default();
        config.max_concurrency = 0;
        assert!(validate_config(&config).is_err());
    }
}
