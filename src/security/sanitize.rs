//! Response and error sanitization.
//!
//! Everything here is total: these functions sit on the response and error
//! paths, where failing would hide the original problem.
//!
//! Recursion follows the depth of the input. JSON decoded by `serde_json`
//! is already depth-limited; callers building values by hand are
//! responsible for keeping them reasonable.

use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Fallback used when an error carries no readable message.
pub const GENERIC_ERROR: &str = "An error occurred";

/// Replacement for sensitive log values.
pub const REDACTED: &str = "[REDACTED]";

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern is valid")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("url pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbearer\s+\S+").expect("bearer pattern is valid"));

static API_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)api[_-]?token(?:\s*:\s*|\s+)\S+")
        .expect("api token pattern is valid")
});

static SENSITIVE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)token|password|secret|key|auth").expect("sensitive key pattern is valid")
});

/// Strip `<script>` blocks from every string leaf, keeping the shape.
pub fn sanitize_response_body(data: Value) -> Value {
    match data {
        Value::String(s) => Value::String(strip_scripts(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_response_body).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_response_body(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Remove script blocks until none are left.
///
/// Looping covers input like `<scr<script></script>ipt>`, where a single
/// pass would assemble a new block out of the leftovers.
pub fn strip_scripts(input: &str) -> String {
    let mut current = input.to_string();
    while SCRIPT_RE.is_match(&current) {
        current = SCRIPT_RE.replace_all(&current, "").into_owned();
    }
    current
}

/// Apply the four redaction rules, in order, to a message.
pub fn redact_message(message: &str) -> String {
    let redacted = URL_RE.replace_all(message, "[URL_REDACTED]");
    let redacted = EMAIL_RE.replace_all(&redacted, "[EMAIL_REDACTED]");
    let redacted = BEARER_RE.replace_all(&redacted, "Bearer [TOKEN_REDACTED]");
    let redacted = API_TOKEN_RE.replace_all(&redacted, "api_token: [REDACTED]");
    redacted.into_owned()
}

/// Turn an error-like JSON value into a redacted, human-readable string.
pub fn sanitize_error_text(error: &Value) -> String {
    let message = match error {
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        },
        Value::String(s) => Some(s.clone()),
        _ => None,
    };

    match message {
        Some(msg) => redact_message(&msg),
        None => GENERIC_ERROR.to_string(),
    }
}

/// Redacted display text of a Rust error.
pub fn sanitize_error(error: &dyn Display) -> String {
    redact_message(&error.to_string())
}

/// Prepare a structured context for logging.
///
/// Values under sensitive-looking keys are replaced outright; every other
/// string goes through [`redact_message`].
pub fn sanitize_log_context(context: Value) -> Value {
    match context {
        Value::String(s) => Value::String(redact_message(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_log_context).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if SENSITIVE_KEY_RE.is_match(&k) {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, sanitize_log_context(v))
                    }
                })
                .collect(),
        ),
        other => other,
    }
}
