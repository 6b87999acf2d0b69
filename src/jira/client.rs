//! Jira Cloud REST client.
//!
//! # Responsibilities
//! - Issue authenticated GET requests against the Jira REST and Agile APIs
//! - Pass the upstream rate limiter before every attempt
//! - Strip scripts from every response body before it leaves this module
//! - Redact every failure before it leaves this module
//! - Retry transient failures with backoff

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::{JiraConfig, RetryConfig, TimeoutConfig};
use crate::error::{GatewayError, Result};
use crate::jira::types::{error_summary, parse_issues, Issue};
use crate::observability::metrics;
use crate::resilience::backoff::backoff_for;
use crate::resilience::retries::{is_retryable_error, is_retryable_status};
use crate::security::rate_limit::RateLimiter;
use crate::security::sanitize::sanitize_response_body;

/// Limiter key shared by every outbound Jira call.
pub const UPSTREAM_KEY: &str = "jira";

const ISSUE_FIELDS: &str = "summary,status,issuetype,assignee,resolutiondate,project";
const CLOSED_ISSUE_PAGE: u64 = 100;
const MAX_CLOSED_ISSUE_PAGES: u32 = 50;

/// Jira client with an injected upstream rate limiter.
#[derive(Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
    retries: RetryConfig,
    limiter: Arc<RateLimiter>,
}

impl JiraClient {
    /// Create a new client.
    pub fn new(
        config: &JiraConfig,
        timeouts: &TimeoutConfig,
        retries: &RetryConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .user_agent(concat!("jira-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
            retries: retries.clone(),
            limiter,
        })
    }

    /// The upstream limiter this client admits requests through.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetch one agile board.
    pub async fn get_board(&self, board_id: &str) -> Result<Value> {
        self.get_json(&format!("/rest/agile/1.0/board/{}", board_id), &[])
            .await
    }

    /// Fetch several boards, in order. Stops at the first failure.
    pub async fn get_boards(&self, board_ids: &[String]) -> Result<Vec<Value>> {
        let mut boards = Vec::with_capacity(board_ids.len());
        for id in board_ids {
            boards.push(self.get_board(id).await?);
        }
        Ok(boards)
    }

    /// Run a JQL search.
    pub async fn search_issues(&self, jql: &str, max_results: u64) -> Result<Value> {
        self.get_json(
            "/rest/api/3/search",
            &[
                ("jql", jql.to_string()),
                ("maxResults", max_results.to_string()),
                ("fields", ISSUE_FIELDS.to_string()),
            ],
        )
        .await
    }

    /// Fetch one project by key or id.
    pub async fn get_project(&self, key: &str) -> Result<Value> {
        self.get_json(&format!("/rest/api/3/project/{}", key), &[]).await
    }

    /// Issues resolved in the last `days` days on each board.
    ///
    /// Each board is read page by page until `total` is reached or a page
    /// comes back empty; every page passes the upstream limiter. An issue
    /// that sits on several boards is reported once, under the first board
    /// that returned it.
    pub async fn get_closed_items(&self, board_ids: &[String], days: i64) -> Result<Vec<Issue>> {
        let jql = closed_items_jql(days);
        let mut seen = HashSet::new();
        let mut issues = Vec::new();

        for board_id in board_ids {
            let path = format!("/rest/agile/1.0/board/{}/issue", board_id);
            let mut start_at: u64 = 0;
            let mut pages = 0;

            loop {
                let body = self
                    .get_json(
                        &path,
                        &[
                            ("jql", jql.clone()),
                            ("startAt", start_at.to_string()),
                            ("maxResults", CLOSED_ISSUE_PAGE.to_string()),
                            ("fields", ISSUE_FIELDS.to_string()),
                        ],
                    )
                    .await?;
                pages += 1;

                let page_len = body
                    .get("issues")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len) as u64;
                for issue in parse_issues(&body, board_id) {
                    if seen.insert(issue.key.clone()) {
                        issues.push(issue);
                    }
                }

                start_at += page_len;
                let total = body.get("total").and_then(Value::as_u64).unwrap_or(start_at);
                if page_len == 0 || start_at >= total {
                    break;
                }
                if pages >= MAX_CLOSED_ISSUE_PAGES {
                    tracing::warn!(board = %board_id, fetched = start_at, total, "Closed items truncated at page limit");
                    break;
                }
            }
        }

        tracing::info!(boards = board_ids.len(), days, issues = issues.len(), "Fetched closed items");
        Ok(issues)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let max_attempts = if self.retries.enabled {
            self.retries.max_attempts.max(1)
        } else {
            1
        };
        let mut attempt = 0;

        loop {
            attempt += 1;

            if !self.limiter.is_allowed(UPSTREAM_KEY) {
                tracing::warn!(path = %path, "Upstream rate limit reached, request not sent");
                metrics::record_rate_limited(self.limiter.name());
                return Err(GatewayError::RateLimitExceeded);
            }

            let start = Instant::now();
            let result = self
                .http
                .get(&url)
                .basic_auth(&self.email, Some(&self.api_token))
                .header(ACCEPT, "application/json")
                .query(query)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    metrics::record_upstream(status.as_u16(), start);

                    if status.is_success() {
                        let body: Value = response.json().await.map_err(GatewayError::upstream)?;
                        return Ok(sanitize_response_body(body));
                    }

                    if attempt < max_attempts && is_retryable_status(status) {
                        let delay = backoff_for(&self.retries, attempt);
                        tracing::info!(path = %path, attempt, status = %status, delay = ?delay, "Retrying Jira request");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    let detail = error_summary(&body)
                        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
                    let err = GatewayError::upstream(format!(
                        "Jira returned {} for {}: {}",
                        status.as_u16(),
                        path,
                        detail
                    ));
                    tracing::warn!(error = %err, "Jira request failed");
                    return Err(err);
                }
                Err(e) => {
                    metrics::record_upstream(0, start);

                    if attempt < max_attempts && is_retryable_error(&e) {
                        let delay = backoff_for(&self.retries, attempt);
                        tracing::info!(path = %path, attempt, delay = ?delay, "Retrying Jira request after network error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let err = GatewayError::upstream(e);
                    tracing::warn!(error = %err, "Jira request failed");
                    return Err(err);
                }
            }
        }
    }
}

/// JQL selecting issues resolved within the last `days` days.
pub fn closed_items_jql(days: i64) -> String {
    format!(
        "status in (Done, Closed, Resolved) AND resolved >= -{}d ORDER BY resolved DESC",
        days
    )
}
