//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with health, readiness and MCP endpoints
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Gate `/mcp` behind the caller allow-list and per-caller rate limit
//! - Own the rate limiters and the Jira client
//! - Apply hot-reloaded configuration
//! - Run background sweeps until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::http::health::{health_handler, ready_handler};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::jira::JiraClient;
use crate::mcp::mcp_handler;
use crate::security::auth::auth_middleware;
use crate::security::rate_limit::{caller_rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration; replaced on reload.
    pub config: Arc<ArcSwap<GatewayConfig>>,
    pub jira: JiraClient,
    pub callers: Arc<RateLimiter>,
    pub webhook_http: reqwest::Client,
}

impl AppState {
    /// Build state from a validated configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let limits = &config.rate_limit;
        let upstream = Arc::new(
            RateLimiter::new(limits.upstream.max_requests, limits.upstream.window()).named("upstream"),
        );
        let callers = Arc::new(
            RateLimiter::new(limits.callers.max_requests, limits.callers.window()).named("callers"),
        );

        let jira = JiraClient::new(&config.jira, &config.timeouts, &config.retries, upstream)?;
        let webhook_http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build webhook client: {}", e)))?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            jira,
            callers,
            webhook_http,
        })
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let state = AppState::from_config(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState) -> Router {
        let (request_secs, max_body) = {
            let config = state.config.load();
            (config.timeouts.request_secs, config.listener.max_body_bytes)
        };

        let tools = Router::new()
            .route("/mcp", post(mcp_handler))
            .layer(middleware::from_fn_with_state(
                state.callers.clone(),
                caller_rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .merge(tools)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(max_body))
            // Leave room for the upstream timeout and one backoff.
            .layer(TimeoutLayer::new(Duration::from_secs(request_secs.saturating_mul(2))))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// A clone of the router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_interval = Duration::from_secs(
            self.state.config.load().rate_limit.cleanup_interval_secs.max(1),
        );
        self.state
            .jira
            .limiter()
            .clone()
            .spawn_sweeper(sweep_interval, shutdown.resubscribe());
        self.state
            .callers
            .clone()
            .spawn_sweeper(sweep_interval, shutdown.resubscribe());

        let live_config = self.state.config.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => {
                            live_config.store(Arc::new(new_config));
                            tracing::info!("Configuration reloaded");
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
