//! Chat model access.
//!
//! The generation model is reached through an OpenAI-compatible chat
//! completions API. Gemini exposes one, so the default settings point there.

use crate::config::ModelSettings;
use crate::error::{LearnPathError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Create an OpenAI-compatible client for `api_base` with a request timeout.
pub fn create_client(api_key: &str, api_base: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base.trim_end_matches('/'));

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// One reply from the model.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: Option<String>,
    /// Tool calls requested by the model. Empty when the turn is final.
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
}

/// A chat model that can request tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation so far and return the next turn.
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelTurn>;

    /// Model identifier used in logs and reports.
    fn name(&self) -> &str;
}

/// Chat model behind an OpenAI-compatible endpoint.
pub struct OpenAiCompatibleModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatibleModel {
    pub fn new(client: Client<OpenAIConfig>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    /// Build a model from settings and an API key.
    pub fn from_settings(settings: &ModelSettings, api_key: &str) -> Result<Self> {
        let client = create_client(
            api_key,
            &settings.api_base,
            Duration::from_secs(settings.timeout_seconds),
        )?;
        Ok(Self::new(client, &settings.name)
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelTurn> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages.to_vec())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        if !tools.is_empty() {
            args.tools(tools.to_vec());
        }
        let request = args
            .build()
            .map_err(|e| LearnPathError::Model(e.to_string()))?;

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LearnPathError::Model(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LearnPathError::Model("No response from model".to_string()))?;

        Ok(ModelTurn {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_openai::types::{ChatCompletionToolType, FunctionCall};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Chat model that replays a fixed list of turns.
    ///
    /// Once the script runs out it answers with a final "done" message.
    #[derive(Default)]
    pub(crate) struct ScriptedModel {
        turns: Mutex<VecDeque<ModelTurn>>,
        requests: Mutex<Vec<Vec<ChatCompletionRequestMessage>>>,
        repeat_last: bool,
    }

    impl ScriptedModel {
        pub(crate) fn new(turns: Vec<ModelTurn>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                ..Self::default()
            }
        }

        /// Model that requests the same tool call forever.
        pub(crate) fn looping(turn: ModelTurn) -> Self {
            Self {
                turns: Mutex::new(VecDeque::from(vec![turn])),
                repeat_last: true,
                ..Self::default()
            }
        }

        /// Every conversation sent to the model, in order.
        pub(crate) fn requests(&self) -> Vec<Vec<ChatCompletionRequestMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    pub(crate) fn text(content: &str) -> ModelTurn {
        ModelTurn {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }
    }

    pub(crate) fn tool_call(id: &str, name: &str, arguments: &str) -> ModelTurn {
        ModelTurn {
            content: None,
            tool_calls: vec![ChatCompletionMessageToolCall {
                id: id.to_string(),
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }],
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            messages: &[ChatCompletionRequestMessage],
            _tools: &[ChatCompletionTool],
        ) -> Result<ModelTurn> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let mut turns = self.turns.lock().unwrap();
            let turn = if self.repeat_last {
                turns.front().cloned()
            } else {
                turns.pop_front()
            };
            Ok(turn.unwrap_or_else(|| text("done")))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_uses_configured_model() {
        let settings = ModelSettings::default();
        let model = OpenAiCompatibleModel::from_settings(&settings, "AIzaTest").unwrap();
        assert_eq!(model.name(), "gemini-2.5-flash");
        assert_eq!(model.temperature, 0.7);
        assert_eq!(model.max_tokens, 4000);
    }

    #[test]
    fn test_create_client_accepts_trailing_slash() {
        let client = create_client(
            "AIzaTest",
            "https://generativelanguage.googleapis.com/v1beta/openai/",
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
    }
}
