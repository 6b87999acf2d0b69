//! Jira Cloud integration.
//!
//! # Data Flow
//! ```text
//! validated tool arguments
//!     → client.rs (rate limiter → GET → sanitize body | redact error)
//!     → types.rs (typed Issue views for rendering)
//! ```

pub mod client;
pub mod types;

pub use client::{JiraClient, UPSTREAM_KEY};
pub use types::Issue;
