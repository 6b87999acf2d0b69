//! Model Context Protocol surface.
//!
//! # Data Flow
//! ```text
//! POST /mcp (authenticated, caller rate limited)
//!     → server.rs (JSON-RPC routing)
//!     → tools.rs (validate arguments → Jira client → render/notify)
//! ```

pub mod server;
pub mod tools;

pub use server::mcp_handler;
pub use tools::{call_tool, tool_definitions, ToolOutput};
