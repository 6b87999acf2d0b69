//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to Jira:
//!     → reqwest client timeouts (connect + total)
//!     → On failure: retries.rs (retryable?) → backoff.rs (how long to wait)
//!     → Each retry passes the upstream rate limiter again
//! ```

pub mod backoff;
pub mod retries;
