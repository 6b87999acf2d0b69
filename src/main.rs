//! Jira gateway server.
//!
//! ```text
//!   MCP host ──POST /mcp──▶ auth ─▶ caller limit ─▶ validate ─▶ upstream limit ─▶ Jira
//!            ◀── result ─── redact errors ◀── sanitize body ◀────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use jira_gateway::config::loader::{apply_env_overrides, load_config};
use jira_gateway::config::validation::validate_config;
use jira_gateway::config::watcher::ConfigWatcher;
use jira_gateway::config::{ConfigError, GatewayConfig};
use jira_gateway::lifecycle::signals::wait_for_signal;
use jira_gateway::observability::{logging, metrics};
use jira_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "jira-gateway", version, about = "Credential-gated Jira gateway for MCP hosts")]
struct Args {
    /// Path to the TOML configuration file. Watched for changes.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            apply_env_overrides(&mut config, |name| std::env::var(name).ok());
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jira-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        jira = %logging::log_safe(&config.jira.base_url),
        jira_credentials = config.jira.has_credentials(),
        auth_enabled = config.auth.enabled,
        upstream_quota = config.rate_limit.upstream.max_requests,
        upstream_window_ms = config.rate_limit.upstream.window_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher must stay alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
