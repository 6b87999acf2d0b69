//! Error types for the gateway.
//!
//! Every error that reaches a caller goes through [`GatewayError`]. Upstream
//! failures are redacted when they are constructed, so an `Upstream` value
//! never holds a raw URL, email or token.

use std::fmt::Display;

use axum::http::StatusCode;
use thiserror::Error;

use crate::security::sanitize::redact_message;

/// JSON-RPC code for invalid tool arguments.
pub const RPC_INVALID_PARAMS: i64 = -32602;

/// JSON-RPC code for server-side failures.
pub const RPC_SERVER_ERROR: i64 = -32000;

/// Main error type for gateway operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Caller-supplied argument failed validation.
    #[error("{0}")]
    InvalidArgument(String),

    /// The outbound quota for the current window is used up.
    #[error("Rate limit exceeded, try again later")]
    RateLimitExceeded,

    /// Jira, webhook or network failure. The message is already redacted.
    #[error("{0}")]
    Upstream(String),

    /// Missing or unknown caller credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// Configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Build an upstream failure, redacting its message.
    pub fn upstream(err: impl Display) -> Self {
        GatewayError::Upstream(redact_message(&err.to_string()))
    }

    /// Build a validation failure.
    pub fn invalid(msg: impl Into<String>) -> Self {
        GatewayError::InvalidArgument(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn rpc_code(&self) -> i64 {
        match self {
            GatewayError::InvalidArgument(_) => RPC_INVALID_PARAMS,
            _ => RPC_SERVER_ERROR,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidArgument(_) => "invalid_argument",
            GatewayError::RateLimitExceeded => "rate_limited",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Unauthorized => "unauthorized",
            GatewayError::Config(_) => "config",
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
