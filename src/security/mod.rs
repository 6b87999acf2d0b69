//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming tool call:
//!     → auth.rs (Bearer credential on the allow-list)
//!     → rate_limit.rs (per-caller window)
//!     → validate.rs (tool arguments, before any network call)
//!
//! Outbound Jira call:
//!     → rate_limit.rs (global upstream window)
//!     → sanitize.rs (strip scripts from the response body)
//!
//! Any failure on the way back:
//!     → sanitize.rs (redact URLs, emails, tokens)
//! ```
//!
//! # Design Decisions
//! - Fail closed: unknown callers and bad arguments never reach Jira
//! - Sanitizers never fail; they sit on the error path
//! - Limiters are owned instances, injected where they are used

pub mod auth;
pub mod rate_limit;
pub mod sanitize;
pub mod validate;

pub use rate_limit::RateLimiter;
pub use validate::OutputFormat;
