//! Tool implementations exposed over MCP.
//!
//! Every tool validates all of its arguments before touching Jira, so a bad
//! call never consumes upstream quota.

use serde_json::{json, Value};

use crate::content;
use crate::error::{GatewayError, Result};
use crate::http::server::AppState;
use crate::observability::logging::{log_context, log_safe};
use crate::observability::metrics;
use crate::security::validate::{
    validate_board_ids, validate_days, validate_format, validate_jql, validate_max_results,
    validate_project_key, OutputFormat,
};
use crate::webhooks::{summarize, DeliveryOutcome, WebhookNotifier};

/// Result of a successful tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub deliveries: Option<Vec<DeliveryOutcome>>,
}

impl ToolOutput {
    fn text(text: String) -> Self {
        Self {
            text,
            deliveries: None,
        }
    }

    fn json(value: &Value) -> Self {
        Self::text(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
    }
}

/// Names of every tool this server answers.
pub const TOOL_NAMES: [&str; 5] = [
    "get_boards",
    "get_closed_items",
    "get_project",
    "search_issues",
    "scaffold_announcement",
];

/// Metric label for a requested tool name. Names outside [`TOOL_NAMES`]
/// share one label so callers cannot grow the series set.
pub fn tool_label(name: &str) -> &'static str {
    TOOL_NAMES
        .iter()
        .copied()
        .find(|known| *known == name)
        .unwrap_or("unknown")
}

/// Tool declarations for `tools/list`.
pub fn tool_definitions() -> Vec<Value> {
    let board_ids = json!({
        "type": "array",
        "items": {"type": "string", "pattern": "^[A-Za-z0-9_-]+$"},
        "minItems": 1,
        "maxItems": 10,
        "description": "Jira board IDs"
    });
    let days = json!({
        "type": "integer",
        "minimum": 1,
        "maximum": 90,
        "description": "Look-back period in days"
    });

    vec![
        json!({
            "name": "get_boards",
            "description": "Fetch Jira agile boards by ID.",
            "inputSchema": {
                "type": "object",
                "properties": {"boardIds": board_ids},
                "required": ["boardIds"]
            }
        }),
        json!({
            "name": "get_closed_items",
            "description": "List issues resolved on the given boards within the last N days.",
            "inputSchema": {
                "type": "object",
                "properties": {"boardIds": board_ids, "days": days},
                "required": ["boardIds", "days"]
            }
        }),
        json!({
            "name": "get_project",
            "description": "Fetch a Jira project by key.",
            "inputSchema": {
                "type": "object",
                "properties": {"projectKey": {"type": "string"}}
            }
        }),
        json!({
            "name": "search_issues",
            "description": "Run a JQL search.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "jql": {"type": "string"},
                    "maxResults": {"type": "integer", "minimum": 1, "maximum": 100}
                },
                "required": ["jql"]
            }
        }),
        json!({
            "name": "scaffold_announcement",
            "description": "Render closed issues as a Markdown blog post and/or announcement, optionally posting a summary to chat webhooks.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "boardIds": board_ids,
                    "days": days,
                    "format": {"type": "string", "enum": ["blog", "announcement", "both"], "default": "both"},
                    "notify": {"type": "boolean", "default": false}
                },
                "required": ["boardIds", "days"]
            }
        }),
    ]
}

/// Dispatch a tool call by name.
pub async fn call_tool(state: &AppState, name: &str, args: &Value) -> Result<ToolOutput> {
    let label = tool_label(name);
    tracing::info!(tool = label, requested = %log_safe(name), args = %log_context(args), "Tool call");

    let result = match name {
        "get_boards" => get_boards(state, args).await,
        "get_closed_items" => get_closed_items(state, args).await,
        "get_project" => get_project(state, args).await,
        "search_issues" => search_issues(state, args).await,
        "scaffold_announcement" => scaffold_announcement(state, args).await,
        _ => Err(GatewayError::invalid(format!("Unknown tool: {}", name))),
    };

    match &result {
        Ok(_) => metrics::record_tool_call(label, "ok"),
        Err(e) => {
            tracing::warn!(tool = label, error = %log_safe(&e.to_string()), "Tool call failed");
            metrics::record_tool_call(label, e.kind());
        }
    }
    result
}

fn arg<'a>(args: &'a Value, name: &str) -> &'a Value {
    args.get(name).unwrap_or(&Value::Null)
}

async fn get_boards(state: &AppState, args: &Value) -> Result<ToolOutput> {
    let board_ids = validate_board_ids(arg(args, "boardIds"))?;
    let boards = state.jira.get_boards(&board_ids).await?;
    Ok(ToolOutput::json(&json!({ "boards": boards })))
}

async fn get_closed_items(state: &AppState, args: &Value) -> Result<ToolOutput> {
    let board_ids = validate_board_ids(arg(args, "boardIds"))?;
    let days = validate_days(arg(args, "days"))?;

    let issues = state.jira.get_closed_items(&board_ids, days).await?;
    Ok(ToolOutput::json(&json!({
        "boardIds": board_ids,
        "days": days,
        "count": issues.len(),
        "issues": issues,
    })))
}

async fn get_project(state: &AppState, args: &Value) -> Result<ToolOutput> {
    let key = match args.get("projectKey") {
        Some(v) if !v.is_null() => validate_project_key(v)?,
        _ => {
            let config = state.config.load();
            match &config.jira.default_project {
                Some(default) => validate_project_key(&Value::String(default.clone()))?,
                None => return Err(GatewayError::invalid("projectKey is required")),
            }
        }
    };
    let project = state.jira.get_project(&key).await?;
    Ok(ToolOutput::json(&project))
}

async fn search_issues(state: &AppState, args: &Value) -> Result<ToolOutput> {
    let jql = validate_jql(arg(args, "jql"))?;
    let max_results = validate_max_results(args.get("maxResults"))?;
    let body = state.jira.search_issues(&jql, max_results).await?;
    Ok(ToolOutput::json(&body))
}

async fn scaffold_announcement(state: &AppState, args: &Value) -> Result<ToolOutput> {
    let board_ids = validate_board_ids(arg(args, "boardIds"))?;
    let days = validate_days(arg(args, "days"))?;
    // Absent means "both"; anything present must be one of the literals.
    let format = match args.get("format") {
        None => OutputFormat::Both,
        Some(v) => validate_format(v)?,
    };
    let notify = match args.get("notify") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(GatewayError::invalid("notify must be a boolean")),
    };

    let issues = state.jira.get_closed_items(&board_ids, days).await?;

    let config = state.config.load_full();
    let today = chrono::Utc::now().date_naive();
    let rendered = content::render(format, &issues, days, &config.content, today);
    let mut output = ToolOutput::text(rendered.to_markdown());

    if notify {
        if config.webhooks.is_empty() {
            tracing::info!("Notification requested but no webhooks are configured");
            output.deliveries = Some(Vec::new());
        } else {
            let notifier = WebhookNotifier::new(state.webhook_http.clone(), config.webhooks.clone());
            let title = format!("{}: last {} days", config.content.site_title, days);
            output.deliveries = Some(notifier.publish(&title, &summarize(&issues, days)).await);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_cover_known_names() {
        let names: Vec<_> = tool_definitions()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, TOOL_NAMES);
    }

    #[test]
    fn test_tool_label_is_bounded() {
        assert_eq!(tool_label("get_project"), "get_project");
        assert_eq!(tool_label("x1"), "unknown");
        assert_eq!(tool_label("x2"), "unknown");
        assert_eq!(tool_label("GET_PROJECT"), "unknown");
        assert_eq!(tool_label(""), "unknown");
    }

    #[test]
    fn test_schemas_match_validators() {
        let tools = tool_definitions();
        let closed = &tools[1]["inputSchema"]["properties"];
        assert_eq!(closed["days"]["maximum"], 90);
        assert_eq!(closed["boardIds"]["maxItems"], 10);
    }
}
