//! MCP (Model Context Protocol) client.
//!
//! Talks JSON-RPC 2.0 over the streamable HTTP transport to the servers that
//! provide YouTube, Google Drive and Notion capabilities.

mod client;
mod protocol;
mod session;

#[cfg(test)]
mod fake_server;

pub use client::{McpConnector, MultiServerClient};
pub use protocol::{ServerInfo, Tool, ToolCallResult, ToolContent};
pub use session::{http_client, McpSession};
