//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! rules. Validation is a pure function that reports every problem it
//! finds, not just the first.

use std::fmt;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "must be a socket address like 0.0.0.0:8080",
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    match Url::parse(&config.jira.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => errors.push(ValidationError::new("jira.base_url", "must use http or https")),
        Err(_) => errors.push(ValidationError::new("jira.base_url", "must be a valid URL")),
    }

    if config.auth.enabled && config.auth.api_keys.is_empty() {
        errors.push(ValidationError::new(
            "auth.api_keys",
            "must list at least one key when auth is enabled",
        ));
    }
    if config.auth.api_keys.iter().any(|k| k.trim().is_empty()) {
        errors.push(ValidationError::new("auth.api_keys", "must not contain blank keys"));
    }

    if config.rate_limit.upstream.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.upstream.window_ms", "must be greater than 0"));
    }
    if config.rate_limit.callers.window_ms == 0 {
        errors.push(ValidationError::new("rate_limit.callers.window_ms", "must be greater than 0"));
    }
    if config.rate_limit.cleanup_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.cleanup_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.timeouts.connect_secs == 0 || config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts", "timeouts must be greater than 0"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    for (field, target) in [
        ("webhooks.slack_url", &config.webhooks.slack_url),
        ("webhooks.teams_url", &config.webhooks.teams_url),
    ] {
        if let Some(raw) = target {
            match Url::parse(raw) {
                Ok(url) if url.scheme() == "https" => {}
                _ => errors.push(ValidationError::new(field, "must be an https URL")),
            }
        }
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"pretty\" or \"json\"",
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.auth.api_keys = vec!["k1".into()];
        config
    }

    #[test]
    fn test_default_with_key_is_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_auth_requires_keys() {
        let mut config = valid();
        config.auth.api_keys.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "auth.api_keys");

        config.auth.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.jira.base_url = "ftp://jira".into();
        config.rate_limit.upstream.window_ms = 0;
        config.retries.max_attempts = 0;
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "jira.base_url",
                "rate_limit.upstream.window_ms",
                "retries.max_attempts",
                "observability.log_format"
            ]
        );
    }

    #[test]
    fn test_zero_quota_is_allowed() {
        let mut config = valid();
        config.rate_limit.upstream.max_requests = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_webhooks_must_be_https() {
        let mut config = valid();
        config.webhooks.slack_url = Some("http://hooks.slack.com/x".into());
        config.webhooks.teams_url = Some("https://acme.webhook.office.com/x".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "webhooks.slack_url");
    }
}
