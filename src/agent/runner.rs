//! Agent runner with tool calling loop.

use super::tools::{parse_tool_arguments, tool_definitions};
use crate::capability::{Capability, CapabilityProvider};
use crate::error::{LearnPathError, Result};
use crate::llm::ChatModel;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default bound on model turns in one run.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Binds a chat model to the capabilities found during negotiation.
#[derive(Clone)]
pub struct AgentFactory {
    model: Arc<dyn ChatModel>,
    recursion_limit: usize,
}

impl AgentFactory {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Set the maximum number of model turns for agents built by this factory.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Create an agent that may call `capabilities` through `provider`.
    pub fn bind(&self, provider: Arc<dyn CapabilityProvider>, capabilities: Vec<Capability>) -> Agent {
        let tools = tool_definitions(&capabilities);
        Agent {
            model: self.model.clone(),
            provider,
            capabilities,
            tools,
            recursion_limit: self.recursion_limit,
        }
    }
}

/// Agent that drives a chat model against remote capabilities.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    provider: Arc<dyn CapabilityProvider>,
    capabilities: Vec<Capability>,
    tools: Vec<ChatCompletionTool>,
    recursion_limit: usize,
}

impl Agent {
    /// Capabilities the agent was bound to.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Release the provider's connections once the run is over.
    pub async fn close(&self) {
        self.provider.close().await;
    }

    /// Run the agent on a single human message until the model stops calling tools.
    pub async fn run(&self, prompt: &str) -> Result<AgentResponse> {
        let mut request: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LearnPathError::Agent(e.to_string()))?
                .into(),
        ];
        let mut messages = vec![AgentMessage::new(MessageRole::Human, prompt)];

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.recursion_limit {
                return Err(LearnPathError::Agent(format!(
                    "Agent exceeded recursion limit ({})",
                    self.recursion_limit
                )));
            }

            debug!("Agent iteration {}", iterations);

            let turn = self.model.complete(&request, &self.tools).await?;
            let content = turn.content.clone().unwrap_or_default();

            if turn.tool_calls.is_empty() {
                messages.push(AgentMessage::new(MessageRole::Assistant, &content));
                return Ok(AgentResponse {
                    messages,
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
            assistant.tool_calls(turn.tool_calls.clone());
            if let Some(text) = turn.content.as_deref().filter(|t| !t.is_empty()) {
                assistant.content(text);
            }
            request.push(
                assistant
                    .build()
                    .map_err(|e| LearnPathError::Agent(e.to_string()))?
                    .into(),
            );
            messages.push(AgentMessage::new(MessageRole::Assistant, &content));

            for tool_call in &turn.tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                request.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(&tool_call.id)
                        .content(record.result.clone())
                        .build()
                        .map_err(|e| LearnPathError::Agent(e.to_string()))?
                        .into(),
                );
                messages.push(AgentMessage::new(MessageRole::Tool, &record.result));

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Failures are reported back to the model as text rather than aborting the run.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_arguments(arguments) {
            Ok(args) => match self.provider.call_capability(name, args).await {
                Ok(output) => output,
                Err(e) => {
                    warn!("Tool {} failed: {}", name, e);
                    format!("Tool error: {}", e)
                }
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Who produced a message in the agent transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Assistant,
    Tool,
}

/// One entry of the agent transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMessage {
    pub role: MessageRole,
    pub content: String,
}

impl AgentMessage {
    pub fn new(role: MessageRole, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Response from an agent run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// Every message of the run in order: the human prompt, assistant turns and tool results.
    pub messages: Vec<AgentMessage>,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model turns used.
    pub iterations: usize,
}

impl AgentResponse {
    /// Content of the last assistant message.
    pub fn final_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
