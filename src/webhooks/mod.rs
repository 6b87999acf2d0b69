//! Chat webhook notifications (Slack, Microsoft Teams).
//!
//! Delivery is best effort: a failed post is logged with a redacted reason
//! and reported back, but never fails the tool call that triggered it.

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::WebhookConfig;
use crate::error::GatewayError;
use crate::jira::Issue;

/// Maximum issues listed in a summary before it is truncated.
const SUMMARY_ITEMS: usize = 10;

/// Result of posting to one webhook target.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub target: &'static str,
    pub delivered: bool,
    pub error: Option<String>,
}

pub struct WebhookNotifier {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, config: WebhookConfig) -> Self {
        Self { http, config }
    }

    /// Post `summary` to every configured target.
    pub async fn publish(&self, title: &str, summary: &str) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::new();

        if let Some(url) = &self.config.slack_url {
            outcomes.push(self.post("slack", url, slack_payload(title, summary)).await);
        }
        if let Some(url) = &self.config.teams_url {
            outcomes.push(self.post("teams", url, teams_payload(title, summary)).await);
        }
        outcomes
    }

    async fn post(&self, target: &'static str, url: &str, payload: Value) -> DeliveryOutcome {
        let result = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                tracing::info!(target_name = target, "Webhook delivered");
                DeliveryOutcome {
                    target,
                    delivered: true,
                    error: None,
                }
            }
            Err(e) => {
                let err = GatewayError::upstream(e);
                tracing::warn!(target_name = target, error = %err, "Webhook delivery failed");
                DeliveryOutcome {
                    target,
                    delivered: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

/// One-paragraph plain-text summary of closed issues.
pub fn summarize(issues: &[Issue], days: i64) -> String {
    if issues.is_empty() {
        return format!("No items were closed in the last {} days.", days);
    }

    let listed: Vec<String> = issues
        .iter()
        .take(SUMMARY_ITEMS)
        .map(|i| format!("{} {}", i.key, i.summary))
        .collect();
    let mut text = format!(
        "{} item{} closed in the last {} days: {}",
        issues.len(),
        if issues.len() == 1 { "" } else { "s" },
        days,
        listed.join("; ")
    );
    if issues.len() > SUMMARY_ITEMS {
        text.push_str(&format!(" (and {} more)", issues.len() - SUMMARY_ITEMS));
    }
    text
}

pub fn slack_payload(title: &str, summary: &str) -> Value {
    json!({ "text": format!("*{}*\n{}", title, summary) })
}

pub fn teams_payload(title: &str, summary: &str) -> Value {
    json!({
        "@type": "MessageCard",
        "@context": "https://schema.org/extensions",
        "themeColor": "0076D7",
        "summary": title,
        "title": title,
        "text": summary,
    })
}
