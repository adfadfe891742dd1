//! Tool-calling agent.
//!
//! Binds a chat model to the capabilities discovered on the MCP servers and
//! loops until the model stops requesting tool calls.

mod runner;
mod tools;

pub use runner::{
    Agent, AgentFactory, AgentMessage, AgentResponse, MessageRole, ToolCallRecord,
    DEFAULT_RECURSION_LIMIT,
};
pub use tools::{parse_tool_arguments, sanitize_schema, tool_definitions};
