//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. The `json` format
//! is meant for production log shipping, `pretty` for local runs.

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::security::sanitize::{redact_message, sanitize_log_context};

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("jira_gateway={level},tower_http={level}", level = config.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Render a caller- or upstream-derived context as a log-safe string.
pub fn log_context(context: &Value) -> String {
    sanitize_log_context(context.clone()).to_string()
}

/// Redact free text (config values, caller strings, upstream errors)
/// before it goes into a log field.
pub fn log_safe(text: &str) -> String {
    redact_message(text)
}
