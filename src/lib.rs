//! Credential-gated Jira gateway for MCP/chatbot hosts.
//!
//! Proxies a small set of Jira Cloud endpoints (boards, issue search,
//! projects) as MCP tools, with argument validation, rate limiting and
//! response sanitization, and renders closed work into Markdown for blogs,
//! announcements and chat webhooks.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod jira;
pub mod mcp;

// Output
pub mod content;
pub mod webhooks;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
