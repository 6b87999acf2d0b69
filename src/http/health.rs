//! Liveness and readiness endpoints.
//!
//! `/health` answers as long as the process serves HTTP. `/ready` also
//! requires Jira credentials, since every tool needs them.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::http::server::AppState;

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn ready_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let config = state.config.load();
    if config.jira.has_credentials() {
        (StatusCode::OK, Json(json!({ "ready": true })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "ready": false,
                "reason": "Jira credentials are not configured",
            })),
        )
    }
}
