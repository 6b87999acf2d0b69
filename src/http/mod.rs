//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID generation and propagation)
//!     → health.rs (/health, /ready) | mcp (/mcp, behind auth + rate limit)
//!     → response.rs (errors as JSON with mapped status)
//! ```

pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GatewayServer};
