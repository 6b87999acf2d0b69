//! Typed views over sanitized Jira payloads.
//!
//! Parsing is lenient: Jira omits fields freely depending on the project
//! configuration, so missing values become defaults instead of errors.

use serde::Serialize;
use serde_json::Value;

/// A closed issue as used by rendering and notifications.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
    pub assignee: Option<String>,
    pub resolved: Option<String>,
    pub board_id: String,
}

impl Issue {
    /// Build an issue from one element of a Jira `issues` array.
    ///
    /// Returns `None` when the element has no key.
    pub fn from_json(value: &Value, board_id: &str) -> Option<Self> {
        let key = value.get("key")?.as_str()?.to_string();
        let fields = value.get("fields").unwrap_or(&Value::Null);
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);

        Some(Self {
            key,
            summary: text(fields.get("summary")).unwrap_or_default(),
            status: text(fields.pointer("/status/name")).unwrap_or_else(|| "Unknown".to_string()),
            issue_type: text(fields.pointer("/issuetype/name"))
                .unwrap_or_else(|| "Other".to_string()),
            assignee: text(fields.pointer("/assignee/displayName")),
            resolved: text(fields.get("resolutiondate")),
            board_id: board_id.to_string(),
        })
    }
}

/// Extract the issues of a search/board-issue response body.
pub fn parse_issues(body: &Value, board_id: &str) -> Vec<Issue> {
    body.get("issues")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| Issue::from_json(item, board_id))
                .collect()
        })
        .unwrap_or_default()
}

/// Best-effort human message from a Jira error body.
///
/// Jira reports failures as `{"errorMessages": [...], "errors": {...}}`.
pub fn error_summary(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let mut parts: Vec<String> = value
        .get("errorMessages")
        .and_then(Value::as_array)
        .map(|msgs| msgs.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    if let Some(errors) = value.get("errors").and_then(Value::as_object) {
        for (field, msg) in errors {
            if let Some(msg) = msg.as_str() {
                parts.push(format!("{}: {}", field, msg));
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
