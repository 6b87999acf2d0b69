//! Caller authentication against the configured allow-list.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Identity of an authenticated caller, attached to the request extensions.
///
/// Holds the credential itself, so it is used as a map key and never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl std::fmt::Debug for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallerId([REDACTED])")
    }
}

/// Extract the Bearer credential from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

/// Reject requests whose Bearer token is not on the live allow-list.
pub async fn auth_middleware(
    State(config): State<Arc<ArcSwap<GatewayConfig>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let config = config.load();
    if !config.auth.enabled {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    match token {
        Some(token) if config.auth.api_keys.iter().any(|k| k == &token) => {
            request.extensions_mut().insert(CallerId(token));
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!("Rejected request with unknown credential");
            GatewayError::Unauthorized.into_response()
        }
        None => {
            tracing::warn!("Rejected request without credential");
            GatewayError::Unauthorized.into_response()
        }
    }
}
