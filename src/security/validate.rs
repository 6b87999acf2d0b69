//! Validation of caller-supplied tool arguments.
//!
//! Arguments arrive as untyped JSON. Each validator matches on the value's
//! shape explicitly and either returns a constrained Rust value or fails
//! with [`GatewayError::InvalidArgument`] before any network call happens.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

pub const MAX_BOARD_IDS: usize = 10;
pub const MIN_DAYS: i64 = 1;
pub const MAX_DAYS: i64 = 90;
pub const MAX_SEARCH_RESULTS: u64 = 100;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("identifier pattern is valid"));

/// Which Markdown documents to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Blog,
    Announcement,
    Both,
}

impl OutputFormat {
    pub const ALLOWED: [&'static str; 3] = ["blog", "announcement", "both"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Blog => "blog",
            OutputFormat::Announcement => "announcement",
            OutputFormat::Both => "both",
        }
    }

    pub fn includes_blog(&self) -> bool {
        matches!(self, OutputFormat::Blog | OutputFormat::Both)
    }

    pub fn includes_announcement(&self) -> bool {
        matches!(self, OutputFormat::Announcement | OutputFormat::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a list of board identifiers.
///
/// Entries are stringified and trimmed; order is preserved.
pub fn validate_board_ids(value: &Value) -> Result<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Err(GatewayError::invalid("boardIds must be an array")),
    };

    if items.is_empty() {
        return Err(GatewayError::invalid("boardIds must not be empty"));
    }
    if items.len() > MAX_BOARD_IDS {
        return Err(GatewayError::invalid(format!(
            "boardIds must not contain more than {} entries",
            MAX_BOARD_IDS
        )));
    }

    items
        .iter()
        .map(|item| {
            let id = string_form(item).trim().to_string();
            if IDENTIFIER_RE.is_match(&id) {
                Ok(id)
            } else {
                Err(GatewayError::invalid(format!("Invalid board ID: {}", id)))
            }
        })
        .collect()
}

/// Validate a look-back period in days (1 to 90 inclusive).
///
/// Numeric strings are accepted and parsed the lenient way: leading
/// whitespace and trailing non-digits are ignored, so `"7 days"` is 7.
/// Fractional numbers are truncated.
pub fn validate_days(value: &Value) -> Result<i64> {
    let days = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i),
            (None, Some(f)) if f.is_finite() => Some(clamp_to_i64(f.trunc())),
            _ => None,
        },
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    };

    let days = days.ok_or_else(|| GatewayError::invalid("days must be a number"))?;
    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(GatewayError::invalid(format!(
            "days must be between {} and {}",
            MIN_DAYS, MAX_DAYS
        )));
    }
    Ok(days)
}

/// Validate the output format literal. Matching is case-sensitive.
pub fn validate_format(value: &Value) -> Result<OutputFormat> {
    match value.as_str() {
        Some("blog") => Ok(OutputFormat::Blog),
        Some("announcement") => Ok(OutputFormat::Announcement),
        Some("both") => Ok(OutputFormat::Both),
        _ => Err(GatewayError::invalid(format!(
            "format must be one of: {}",
            OutputFormat::ALLOWED.join(", ")
        ))),
    }
}

/// Validate a Jira project key or id.
pub fn validate_project_key(value: &Value) -> Result<String> {
    let key = match value {
        Value::String(_) | Value::Number(_) => string_form(value).trim().to_string(),
        _ => return Err(GatewayError::invalid("projectKey must be a string")),
    };
    if IDENTIFIER_RE.is_match(&key) {
        Ok(key)
    } else {
        Err(GatewayError::invalid(format!("Invalid project key: {}", key)))
    }
}

/// Validate a JQL query string.
pub fn validate_jql(value: &Value) -> Result<String> {
    match value.as_str().map(str::trim) {
        Some(jql) if !jql.is_empty() => Ok(jql.to_string()),
        Some(_) => Err(GatewayError::invalid("jql must not be empty")),
        None => Err(GatewayError::invalid("jql must be a string")),
    }
}

/// Validate an optional result cap, defaulting to 50.
pub fn validate_max_results(value: Option<&Value>) -> Result<u64> {
    let value = match value {
        None | Some(Value::Null) => return Ok(50),
        Some(v) => v,
    };
    match value.as_u64() {
        Some(n) if (1..=MAX_SEARCH_RESULTS).contains(&n) => Ok(n),
        _ => Err(GatewayError::invalid(format!(
            "maxResults must be between 1 and {}",
            MAX_SEARCH_RESULTS
        ))),
    }
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_leading_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = &rest[..rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len())];
    if digits.is_empty() {
        return None;
    }

    // Too many digits for i64 is still a number, just an out-of-range one.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn clamp_to_i64(f: f64) -> i64 {
    if f >= i64::MAX as f64 {
        i64::MAX
    } else if f <= i64::MIN as f64 {
        i64::MIN
    } else {
        f as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: GatewayError) -> String {
        match err {
            GatewayError::InvalidArgument(msg) => msg,
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_board_ids_trimmed_in_order() {
        let ids = validate_board_ids(&json!(["  123  ", "board "])).unwrap();
        assert_eq!(ids, vec!["123", "board"]);
    }

    #[test]
    fn test_board_ids_numbers_are_stringified() {
        let ids = validate_board_ids(&json!([42, "A_b-9"])).unwrap();
        assert_eq!(ids, vec!["42", "A_b-9"]);
    }

    #[test]
    fn test_board_ids_rejections() {
        let err = validate_board_ids(&json!([])).unwrap_err();
        assert!(message(err).contains("empty"));

        let err = validate_board_ids(&json!(vec!["x"; 11])).unwrap_err();
        assert!(message(err).contains("10"));

        let err = validate_board_ids(&json!("1,2")).unwrap_err();
        assert!(message(err).contains("array"));

        let err = validate_board_ids(&json!(["1", "2; DROP"])).unwrap_err();
        assert_eq!(message(err), "Invalid board ID: 2; DROP");

        let err = validate_board_ids(&json!(["   "])).unwrap_err();
        assert!(message(err).starts_with("Invalid board ID"));
    }

    #[test]
    fn test_board_ids_accepts_ten() {
        let ids = validate_board_ids(&json!(vec!["b"; 10])).unwrap();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_days_bounds() {
        assert_eq!(validate_days(&json!(1)).unwrap(), 1);
        assert_eq!(validate_days(&json!(90)).unwrap(), 90);
        assert!(message(validate_days(&json!(0)).unwrap_err()).contains("1 and 90"));
        assert!(message(validate_days(&json!(91)).unwrap_err()).contains("1 and 90"));
        assert!(message(validate_days(&json!(-5)).unwrap_err()).contains("1 and 90"));
        assert!(message(validate_days(&json!(400)).unwrap_err()).contains("between 1 and 90"));
    }

    #[test]
    fn test_days_numeric_strings() {
        assert_eq!(validate_days(&json!("7")).unwrap(), 7);
        assert_eq!(validate_days(&json!(" 30 ")).unwrap(), 30);
        assert_eq!(validate_days(&json!("14 days")).unwrap(), 14);
        assert_eq!(validate_days(&json!(7.9)).unwrap(), 7);
        assert!(message(validate_days(&json!("99999999999999999999")).unwrap_err())
            .contains("1 and 90"));
    }

    #[test]
    fn test_days_not_a_number() {
        assert!(message(validate_days(&json!("abc")).unwrap_err()).contains("number"));
        assert!(message(validate_days(&json!(null)).unwrap_err()).contains("number"));
        assert!(message(validate_days(&json!([7])).unwrap_err()).contains("number"));
        assert!(message(validate_days(&json!("")).unwrap_err()).contains("number"));
    }

    #[test]
    fn test_format_literals() {
        assert_eq!(validate_format(&json!("blog")).unwrap(), OutputFormat::Blog);
        assert_eq!(validate_format(&json!("announcement")).unwrap(), OutputFormat::Announcement);
        assert_eq!(validate_format(&json!("both")).unwrap(), OutputFormat::Both);

        let msg = message(validate_format(&json!("Blog")).unwrap_err());
        assert_eq!(msg, "format must be one of: blog, announcement, both");
        assert!(validate_format(&json!(1)).is_err());
    }

    #[test]
    fn test_project_key() {
        assert_eq!(validate_project_key(&json!(" OPS ")).unwrap(), "OPS");
        assert_eq!(validate_project_key(&json!(10001)).unwrap(), "10001");
        assert!(validate_project_key(&json!("OPS/../admin")).is_err());
        assert!(validate_project_key(&json!(null)).is_err());
    }

    #[test]
    fn test_jql_and_max_results() {
        assert_eq!(validate_jql(&json!(" project = OPS ")).unwrap(), "project = OPS");
        assert!(validate_jql(&json!("  ")).is_err());
        assert!(validate_jql(&json!(3)).is_err());

        assert_eq!(validate_max_results(None).unwrap(), 50);
        assert_eq!(validate_max_results(Some(&json!(100))).unwrap(), 100);
        assert!(validate_max_results(Some(&json!(0))).is_err());
        assert!(validate_max_results(Some(&json!(101))).is_err());
    }
}
