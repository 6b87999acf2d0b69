//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_tool_calls_total` (counter): tool calls by tool, outcome
//! - `gateway_rate_limited_total` (counter): rejections by limiter
//! - `gateway_upstream_requests_total` (counter): Jira calls by status
//! - `gateway_upstream_duration_seconds` (histogram): Jira call latency
//! - `gateway_rate_limit_tracked_keys` (gauge): live keys per limiter
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_tool_call(tool: &'static str, outcome: &'static str) {
    counter!("gateway_tool_calls_total", "tool" => tool, "outcome" => outcome)
        .increment(1);
}

pub fn record_rate_limited(limiter: &'static str) {
    counter!("gateway_rate_limited_total", "limiter" => limiter).increment(1);
}

pub fn record_upstream(status: u16, start: Instant) {
    counter!("gateway_upstream_requests_total", "status" => status.to_string()).increment(1);
    histogram!("gateway_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_tracked_keys(limiter: &'static str, keys: usize) {
    gauge!("gateway_rate_limit_tracked_keys", "limiter" => limiter).set(keys as f64);
}
