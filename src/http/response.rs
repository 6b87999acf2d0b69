//! Error responses.
//!
//! Errors leave the gateway as `{"error": "<message>"}` with the status
//! from [`GatewayError::status_code`]. Upstream messages are already
//! redacted by construction.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::GatewayError;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            GatewayError::RateLimitExceeded.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            GatewayError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::upstream("boom").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
