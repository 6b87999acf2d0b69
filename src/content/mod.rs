//! Static Markdown content rendered from closed Jira issues.

pub mod markdown;

pub use markdown::{render, RenderedContent};
