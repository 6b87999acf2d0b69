//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Parse and validate config text, using `env` for overrides.
pub fn parse_config<F>(content: &str, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Credentials usually come from the environment rather than the file.
///
/// - `JIRA_BASE_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN` replace file values
/// - `GATEWAY_API_KEYS` (comma separated) is appended to the allow-list
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("JIRA_BASE_URL") {
        config.jira.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(email) = non_empty("JIRA_EMAIL") {
        config.jira.email = email.trim().to_string();
    }
    if let Some(token) = non_empty("JIRA_API_TOKEN") {
        config.jira.api_token = token.trim().to_string();
    }
    if let Some(keys) = non_empty("GATEWAY_API_KEYS") {
        for key in keys.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            if !config.auth.api_keys.iter().any(|k| k == key) {
                config.auth.api_keys.push(key.to_string());
            }
        }
    }
}
