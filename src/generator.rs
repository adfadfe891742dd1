//! End-to-end learning path generation.
//!
//! A run negotiates capabilities, picks an instruction template, and hands the
//! goal to the agent. [`RunContext`] follows the run through its states and
//! records every progress message.

use crate::agent::{AgentFactory, AgentMessage, ToolCallRecord};
use crate::capability::{AvailabilityReport, CapabilityNegotiator, EndpointSet};
use crate::config::{Prompts, Settings};
use crate::error::{LearnPathError, Result};
use crate::llm::OpenAiCompatibleModel;
use crate::mcp::McpConnector;
use crate::progress::{ProgressSink, RunContext, RunState};
use crate::prompt::{self, select_template, PromptTemplate};
use crate::validation::{check_api_key, ApiKeyCheck};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Text returned when a run produced no messages.
pub const EMPTY_RESULT: &str = "No results were generated. Please try again.";

/// What the caller asked for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub goal: String,
    #[serde(flatten)]
    pub endpoints: EndpointSet,
}

impl GenerationRequest {
    pub fn new(goal: &str, endpoints: EndpointSet) -> Self {
        Self {
            goal: goal.to_string(),
            endpoints,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.goal.trim().is_empty() {
            return Err(LearnPathError::InvalidInput(
                "Please enter your learning goal".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub template: PromptTemplate,
    /// Full agent transcript in order.
    pub messages: Vec<AgentMessage>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub status_report: AvailabilityReport,
}

impl GenerationResult {
    /// The transcript formatted for display.
    pub fn learning_path(&self) -> String {
        format_learning_path(&self.messages)
    }
}

/// Format a transcript for display: strip the book glyph, trim, and separate
/// messages with a blank line.
pub fn format_learning_path(messages: &[AgentMessage]) -> String {
    if messages.is_empty() {
        return EMPTY_RESULT.to_string();
    }

    let mut formatted = String::new();
    for message in messages {
        formatted.push_str(message.content.replace('📚', "").trim());
        formatted.push_str("\n\n");
    }
    formatted
}

/// Forwards progress to the caller's sink and records it on the run context.
struct Recorder<'a> {
    ctx: &'a mut RunContext,
    sink: &'a mut dyn ProgressSink,
}

impl ProgressSink for Recorder<'_> {
    fn notify(&mut self, message: &str) {
        let update = self.ctx.record(message);
        self.sink.update(message, update);
    }
}

/// Runs learning path generation.
#[derive(Clone)]
pub struct LearningPathGenerator {
    negotiator: CapabilityNegotiator,
    factory: AgentFactory,
    prompts: Prompts,
}

impl LearningPathGenerator {
    pub fn new(negotiator: CapabilityNegotiator, factory: AgentFactory, prompts: Prompts) -> Self {
        Self {
            negotiator,
            factory,
            prompts,
        }
    }

    /// Build a generator that talks to real MCP servers and the configured model.
    pub fn from_settings(settings: &Settings, api_key: &str) -> Result<Self> {
        match check_api_key(Some(api_key)) {
            ApiKeyCheck::Missing => {
                return Err(LearnPathError::Config(
                    "Please enter your Google AI Studio API key".to_string(),
                ))
            }
            ApiKeyCheck::BadPrefix => warn!("API key does not look like a Google AI Studio key"),
            ApiKeyCheck::Ok => {}
        }

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model = OpenAiCompatibleModel::from_settings(&settings.model, api_key.trim())?;
        let factory = AgentFactory::new(Arc::new(model))
            .with_recursion_limit(settings.model.recursion_limit);

        let connector = McpConnector::from_settings(&settings.mcp)?;
        let negotiator = CapabilityNegotiator::new(Arc::new(connector));

        Ok(Self::new(negotiator, factory, prompts))
    }

    /// Run one generation. `ctx` must be fresh; it ends in `Complete` or `Failed`.
    #[instrument(skip_all, fields(goal = %request.goal))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        ctx: &mut RunContext,
        sink: &mut dyn ProgressSink,
    ) -> Result<GenerationResult> {
        ctx.advance(RunState::Negotiating)?;

        match self.run(request, ctx, sink).await {
            Ok(result) => {
                ctx.advance(RunState::Complete)?;
                info!("Generation run {} complete", result.run_id);
                Ok(result)
            }
            Err(e) => {
                error!("Error in generation run: {}", e);
                if let Err(state_error) = ctx.advance(RunState::Failed) {
                    warn!("{}", state_error);
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        ctx: &mut RunContext,
        sink: &mut dyn ProgressSink,
    ) -> Result<GenerationResult> {
        request.validate()?;

        let negotiation = {
            let mut progress = Recorder {
                ctx: &mut *ctx,
                sink: &mut *sink,
            };
            self.negotiator
                .negotiate(&request.endpoints, &self.factory, &mut progress)
                .await?
        };

        ctx.advance(RunState::Generating)?;
        let mut progress = Recorder { ctx, sink };

        let template = select_template(&negotiation.report);
        progress.notify(template.announcement());
        let text = prompt::render(template, &request.goal, &self.prompts);

        progress.notify("Generating your learning path...");
        info!("Running agent with model {}", negotiation.agent.model_name());
        let outcome = negotiation.agent.run(&text).await;
        negotiation.agent.close().await;
        let response = outcome?;
        progress.notify("Learning path generation complete!");

        Ok(GenerationResult {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            template,
            messages: response.messages,
            tool_calls: response.tool_calls,
            status_report: negotiation.report,
        })
    }

    /// Run one generation to completion on a fresh single-threaded runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn generate_blocking(
        &self,
        request: &GenerationRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<GenerationResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let mut ctx = RunContext::new();
            self.generate(request, &mut ctx, sink).await
        })
    }

    /// Start a generation in the background. Abort the handle to cancel it.
    pub fn spawn<S>(&self, request: GenerationRequest, mut sink: S) -> JoinHandle<Result<GenerationResult>>
    where
        S: ProgressSink + 'static,
    {
        let generator = self.clone();
        tokio::spawn(async move {
            let mut ctx = RunContext::new();
            generator.generate(&request, &mut ctx, &mut sink).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MessageRole;
    use crate::capability::{BucketKey, StaticCapabilityProvider, StaticConnector};
    use crate::llm::testing::{text, tool_call, ScriptedModel};
    use crate::progress::{NoProgress, Section};

    fn generator(provider: StaticCapabilityProvider, model: ScriptedModel) -> LearningPathGenerator {
        LearningPathGenerator::new(
            CapabilityNegotiator::new(Arc::new(StaticConnector::new(provider))),
            AgentFactory::new(Arc::new(model)),
            Prompts::default(),
        )
    }

    fn request(goal: &str) -> GenerationRequest {
        GenerationRequest::new(
            goal,
            EndpointSet {
                youtube_url: Some("https://yt.example.com/mcp".to_string()),
                ..EndpointSet::default()
            },
        )
    }

    #[test]
    fn test_format_strips_glyph_and_separates() {
        let messages = vec![
            AgentMessage::new(MessageRole::Human, "📚Hello"),
            AgentMessage::new(MessageRole::Assistant, "World"),
        ];
        assert_eq!(format_learning_path(&messages), "Hello\n\nWorld\n\n");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_learning_path(&[]), EMPTY_RESULT);
    }

    #[tokio::test]
    async fn test_generate_primary_only() {
        let generator = generator(
            StaticCapabilityProvider::with_names(BucketKey::Youtube, &["youtube-search"]),
            ScriptedModel::new(vec![
                tool_call("call_1", "youtube-search", r#"{"query": "python basics"}"#),
                text("📚 Day 1: Python syntax"),
            ]),
        );

        let mut ctx = RunContext::new();
        let mut seen = Vec::new();
        let result = generator
            .generate(
                &request("I want to learn Python basics in 3 days"),
                &mut ctx,
                &mut |m: &str| seen.push(m.to_string()),
            )
            .await
            .unwrap();

        assert_eq!(result.template, PromptTemplate::PrimaryOnly);
        assert!(result.status_report.youtube_available);
        assert_eq!(result.messages.len(), 4);
        assert!(result.learning_path().ends_with("Day 1: Python syntax\n\n"));

        assert_eq!(ctx.state(), RunState::Complete);
        assert_eq!(ctx.last_section(), Some(Section::Complete));
        assert!(!ctx.is_generating());
        assert!(seen.contains(&"Using YouTube-only learning path generation...".to_string()));
        assert_eq!(seen.last().map(String::as_str), Some("Learning path generation complete!"));
    }

    #[tokio::test]
    async fn test_generate_config_error_fails_run() {
        let generator = generator(
            StaticCapabilityProvider::with_names(BucketKey::Youtube, &["youtube-search"]),
            ScriptedModel::default(),
        );
        let mut ctx = RunContext::new();
        let bad = GenerationRequest::new("learn go", EndpointSet::default());

        let err = generator.generate(&bad, &mut ctx, &mut NoProgress).await.unwrap_err();
        assert!(err.is_config());
        assert_eq!(ctx.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_goal() {
        let generator = generator(StaticCapabilityProvider::default(), ScriptedModel::default());
        let mut ctx = RunContext::new();
        let err = generator
            .generate(&request("  "), &mut ctx, &mut NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnPathError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_reaches_caller() {
        let generator = generator(
            StaticCapabilityProvider::failing("server unavailable"),
            ScriptedModel::default(),
        );
        let mut ctx = RunContext::new();
        let err = generator
            .generate(&request("learn rust"), &mut ctx, &mut NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnPathError::Provider { ref errors, .. } if errors.len() == 1));
        assert_eq!(ctx.state(), RunState::Failed);
    }

    #[tokio::test]
    async fn test_spawned_run_completes() {
        let generator = generator(
            StaticCapabilityProvider::with_names(BucketKey::Youtube, &["youtube-search"]),
            ScriptedModel::new(vec![text("done")]),
        );
        let handle = generator.spawn(request("learn sql"), NoProgress);
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.messages.len(), 2);
    }

    #[test]
    fn test_generate_blocking() {
        let generator = generator(
            StaticCapabilityProvider::with_names(BucketKey::Notion, &["notion-create-page"]),
            ScriptedModel::new(vec![text("Page created")]),
        );
        let result = generator
            .generate_blocking(&request("learn react"), &mut NoProgress)
            .unwrap();
        assert_eq!(result.template, PromptTemplate::Full);
        assert!(result.messages[0].content.starts_with("User Goal: learn react"));
    }
}
