//! Markdown scaffolding for closed Jira work.
//!
//! Output is deterministic for a given issue list and date: groups are
//! sorted by issue type and issues keep their fetch order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ContentConfig;
use crate::jira::Issue;
use crate::security::OutputFormat;

/// Documents produced for one scaffold request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenderedContent {
    pub format: OutputFormat,
    pub blog: Option<String>,
    pub announcement: Option<String>,
}

impl RenderedContent {
    /// All rendered documents as one Markdown text.
    pub fn to_markdown(&self) -> String {
        [self.blog.as_deref(), self.announcement.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n---\n\n")
    }
}

/// Render the documents selected by `format`.
pub fn render(
    format: OutputFormat,
    issues: &[Issue],
    days: i64,
    config: &ContentConfig,
    date: NaiveDate,
) -> RenderedContent {
    RenderedContent {
        format,
        blog: format
            .includes_blog()
            .then(|| render_blog(issues, days, &config.site_title, date)),
        announcement: format
            .includes_announcement()
            .then(|| render_announcement(issues, days, date)),
    }
}

/// Long-form post grouped by issue type, with front matter.
pub fn render_blog(issues: &[Issue], days: i64, site_title: &str, date: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!(
        "title: \"{}: closed work, last {} days\"\n",
        site_title.replace('\\', "\\\\").replace('"', "\\\""),
        days
    ));
    out.push_str(&format!("date: {}\n", date.format("%Y-%m-%d")));
    out.push_str("tags: [jira, release-notes]\n");
    out.push_str("---\n\n");
    out.push_str(&format!("# What we shipped in the last {} days\n\n", days));

    if issues.is_empty() {
        out.push_str(&format!("No items were closed in the last {} days.\n", days));
        return out;
    }

    let boards: BTreeSet<&str> = issues.iter().map(|i| i.board_id.as_str()).collect();
    out.push_str(&format!(
        "{} across {} board{}.\n",
        issue_count(issues.len()),
        boards.len(),
        if boards.len() == 1 { "" } else { "s" }
    ));

    let mut groups: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
    for issue in issues {
        groups.entry(issue.issue_type.as_str()).or_default().push(issue);
    }

    for (issue_type, group) in groups {
        out.push_str(&format!("\n## {} ({})\n\n", escape(issue_type), group.len()));
        for issue in group {
            out.push_str(&format!("- **{}**: {}", issue.key, escape(&issue.summary)));
            if let Some(assignee) = &issue.assignee {
                out.push_str(&format!(" _({})_", escape(assignee)));
            }
            out.push('\n');
        }
    }
    out
}

/// Short announcement listing every closed issue.
pub fn render_announcement(issues: &[Issue], days: i64, date: NaiveDate) -> String {
    let mut out = format!(
        "# Announcement: {} closed in the last {} days\n\n_{}_\n\n",
        item_count(issues.len()),
        days,
        date.format("%Y-%m-%d")
    );

    if issues.is_empty() {
        out.push_str(&format!("No items were closed in the last {} days.\n", days));
        return out;
    }

    for issue in issues {
        out.push_str(&format!("- **{}**: {}\n", issue.key, escape(&issue.summary)));
    }
    out
}

/// Escape characters that Markdown would otherwise interpret.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '#' | '|') {
            out.push('\\');
        }
        if c == '\n' || c == '\r' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn issue_count(n: usize) -> String {
    if n == 1 {
        "1 issue was closed".to_string()
    } else {
        format!("{} issues were closed", n)
    }
}

fn item_count(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{} items", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(key: &str, summary: &str, issue_type: &str, board: &str) -> Issue {
        Issue {
            key: key.into(),
            summary: summary.into(),
            status: "Done".into(),
            issue_type: issue_type.into(),
            assignee: None,
            resolved: None,
            board_id: board.into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_blog_groups_by_type() {
        let mut fixed = issue("OPS-2", "Fix *bold* crash", "Bug", "1");
        fixed.assignee = Some("Sam Lee".into());
        let issues = vec![issue("OPS-1", "Add search", "Story", "1"), fixed];

        let blog = render_blog(&issues, 7, "Eng \"Updates\"", date());
        assert!(blog.starts_with("---\ntitle: \"Eng \\\"Updates\\\": closed work, last 7 days\"\n"));
        assert!(blog.contains("date: 2026-10-19\n"));
        assert!(blog.contains("2 issues were closed across 1 board.\n"));

        let bug = blog.find("## Bug (1)").unwrap();
        let story = blog.find("## Story (1)").unwrap();
        assert!(bug < story);
        assert!(blog.contains("- **OPS-2**: Fix \\*bold\\* crash _(Sam Lee)_\n"));
    }

    #[test]
    fn test_announcement_lists_issues() {
        let issues = vec![issue("A-1", "One", "Task", "1"), issue("B-2", "Two", "Task", "2")];
        let text = render_announcement(&issues, 14, date());
        assert_eq!(
            text,
            "# Announcement: 2 items closed in the last 14 days\n\n_2026-10-19_\n\n- **A-1**: One\n- **B-2**: Two\n"
        );
    }

    #[test]
    fn test_empty_issue_list() {
        let text = render_announcement(&[], 3, date());
        assert!(text.contains("0 items closed"));
        assert!(text.contains("No items were closed in the last 3 days."));

        let blog = render_blog(&[], 3, "Site", date());
        assert!(blog.ends_with("No items were closed in the last 3 days.\n"));
    }

    #[test]
    fn test_render_respects_format() {
        let config = ContentConfig::default();
        let issues = vec![issue("A-1", "One", "Task", "1")];

        let blog_only = render(OutputFormat::Blog, &issues, 7, &config, date());
        assert!(blog_only.blog.is_some());
        assert!(blog_only.announcement.is_none());

        let both = render(OutputFormat::Both, &issues, 7, &config, date());
        let markdown = both.to_markdown();
        assert!(markdown.contains("# What we shipped"));
        assert!(markdown.contains("# Announcement: 1 item closed"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a_b [c] <d>\nnext"), "a\\_b \\[c\\] \\<d\\> next");
    }
}
