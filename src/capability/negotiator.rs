//! Capability negotiation for one generation run.

use super::{AvailabilityReport, CapabilityKeywords, EndpointSet, ProviderConnector, RegistrationRequest};
use crate::agent::{Agent, AgentFactory};
use crate::error::{LearnPathError, Result};
use crate::progress::ProgressSink;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Outcome of a successful negotiation: a bound agent and what was found.
pub struct Negotiation {
    pub agent: Agent,
    pub report: AvailabilityReport,
}

/// Turns endpoint URLs into an agent bound to the capabilities they expose.
#[derive(Clone)]
pub struct CapabilityNegotiator {
    connector: Arc<dyn ProviderConnector>,
    keywords: CapabilityKeywords,
}

impl CapabilityNegotiator {
    pub fn new(connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            connector,
            keywords: CapabilityKeywords::default(),
        }
    }

    /// Use custom bucket keywords instead of the defaults.
    pub fn with_keywords(mut self, keywords: CapabilityKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn keywords(&self) -> &CapabilityKeywords {
        &self.keywords
    }

    /// Query the endpoints and classify what they expose, without binding an agent.
    pub async fn inspect(
        &self,
        endpoints: &EndpointSet,
        progress: &mut dyn ProgressSink,
    ) -> Result<AvailabilityReport> {
        let request = RegistrationRequest::build(endpoints, progress)?;
        let provider = self.connector.connect(&request)?;
        let listed = provider.list_capabilities().await;
        provider.close().await;
        let capabilities = listed.map_err(|e| provider_failure(&e))?;
        let names = capabilities.into_iter().map(|c| c.name).collect();
        Ok(AvailabilityReport::classify(names, &self.keywords))
    }

    /// Negotiate capabilities and bind an agent to them.
    ///
    /// A missing or malformed YouTube endpoint fails with
    /// [`LearnPathError::Config`] before the connector is touched. A failing
    /// capability query fails with [`LearnPathError::Provider`] and no agent.
    #[instrument(skip_all)]
    pub async fn negotiate(
        &self,
        endpoints: &EndpointSet,
        factory: &AgentFactory,
        progress: &mut dyn ProgressSink,
    ) -> Result<Negotiation> {
        progress.notify("Setting up agent with tools...");

        let request = RegistrationRequest::build(endpoints, progress)?;
        info!("Registering {} MCP endpoint(s)", request.len());

        progress.notify("Initializing MCP client...");
        let provider = self.connector.connect(&request)?;

        progress.notify("Getting available tools...");
        let capabilities = match provider.list_capabilities().await {
            Ok(capabilities) => capabilities,
            Err(e) => {
                provider.close().await;
                return Err(provider_failure(&e));
            }
        };

        let names: Vec<String> = capabilities.iter().map(|c| c.name.clone()).collect();
        progress.notify(&format!("Available tools: {}", names.join(", ")));
        let report = AvailabilityReport::classify(names, &self.keywords);
        info!(
            youtube = report.youtube_available,
            drive = report.drive_available,
            notion = report.notion_available,
            "Classified {} capabilities",
            report.available_tools.len()
        );

        progress.notify("Creating AI agent...");
        let agent = factory.bind(provider, capabilities);

        progress.notify("Setup complete! Starting to generate learning path...");

        Ok(Negotiation { agent, report })
    }
}

/// Wrap a capability query failure, recording it as the report's only error.
fn provider_failure(e: &LearnPathError) -> LearnPathError {
    let message = format!("Error in capability negotiation: {}", e);
    error!("{}", message);
    LearnPathError::Provider {
        errors: vec![message.clone()],
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{BucketKey, StaticCapabilityProvider, StaticConnector};
    use crate::llm::testing::ScriptedModel;
    use crate::progress::NoProgress;
    use crate::prompt::{select_template, PromptTemplate};

    fn factory() -> AgentFactory {
        AgentFactory::new(Arc::new(ScriptedModel::default()))
    }

    fn endpoints(youtube: &str) -> EndpointSet {
        EndpointSet {
            youtube_url: Some(youtube.to_string()),
            ..EndpointSet::default()
        }
    }

    #[tokio::test]
    async fn test_malformed_primary_fails_before_connect() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::with_names(
            BucketKey::Youtube,
            &["youtube-search"],
        )));
        let negotiator = CapabilityNegotiator::new(connector.clone());

        let err = negotiator
            .negotiate(&endpoints("youtube"), &factory(), &mut NoProgress)
            .await
            .err()
            .unwrap();

        assert!(matches!(err, LearnPathError::Config(ref m) if m == "Invalid YouTube MCP URL provided"));
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_primary_is_config_error() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::with_names(
            BucketKey::Youtube,
            &["youtube-search"],
        )));
        let negotiator = CapabilityNegotiator::new(connector.clone());

        for url in ["http://999.999.999.999/mcp", "https://example.com:99999/mcp"] {
            let err = negotiator
                .negotiate(&endpoints(url), &factory(), &mut NoProgress)
                .await
                .err()
                .unwrap();
            assert!(err.is_config(), "{} gave {:?}", url, err);
        }
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_only_run() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::with_names(
            BucketKey::Youtube,
            &["youtube-search", "youtube-create-playlist"],
        )));
        let negotiator = CapabilityNegotiator::new(connector);

        let mut seen = Vec::new();
        let negotiation = negotiator
            .negotiate(
                &endpoints("https://yt.example.com/mcp"),
                &factory(),
                &mut |m: &str| seen.push(m.to_string()),
            )
            .await
            .unwrap();

        assert!(negotiation.report.youtube_available);
        assert!(!negotiation.report.drive_available);
        assert!(!negotiation.report.notion_available);
        assert_eq!(select_template(&negotiation.report), PromptTemplate::PrimaryOnly);
        assert_eq!(negotiation.agent.capabilities().len(), 2);
        assert_eq!(
            seen,
            vec![
                "Setting up agent with tools...",
                "Initializing MCP client...",
                "Getting available tools...",
                "Available tools: youtube-search, youtube-create-playlist",
                "Creating AI agent...",
                "Setup complete! Starting to generate learning path...",
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_keywords_select_full_template() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::with_names(
            BucketKey::Youtube,
            &["yt-search", "yt-playlist", "notion-create"],
        )));
        let negotiator = CapabilityNegotiator::new(connector).with_keywords(CapabilityKeywords {
            youtube: vec!["yt".to_string()],
            drive: vec!["drive".to_string(), "google".to_string()],
            notion: vec!["notion".to_string()],
        });
        assert_eq!(negotiator.keywords().youtube, vec!["yt".to_string()]);

        let endpoints = EndpointSet {
            youtube_url: Some("https://yt.example.com/mcp".to_string()),
            drive_url: None,
            notion_url: Some("https://notion.example.com/mcp".to_string()),
        };
        let negotiation = negotiator
            .negotiate(&endpoints, &factory(), &mut NoProgress)
            .await
            .unwrap();

        assert!(negotiation.report.youtube_available);
        assert!(!negotiation.report.drive_available);
        assert!(negotiation.report.notion_available);
        assert_eq!(select_template(&negotiation.report), PromptTemplate::Full);
    }

    #[tokio::test]
    async fn test_provider_failure_carries_one_error() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::failing(
            "connection refused",
        )));
        let negotiator = CapabilityNegotiator::new(connector.clone());

        let result = negotiator
            .negotiate(&endpoints("https://yt.example.com/mcp"), &factory(), &mut NoProgress)
            .await;

        match result {
            Err(LearnPathError::Provider { errors, .. }) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("Error in capability negotiation:"));
                assert!(errors[0].contains("connection refused"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("negotiation should fail"),
        }
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_inspect_reports_without_agent() {
        let connector = Arc::new(StaticConnector::new(StaticCapabilityProvider::with_names(
            BucketKey::Drive,
            &["google-docs-create"],
        )));
        let report = CapabilityNegotiator::new(connector)
            .inspect(&endpoints("https://yt.example.com/mcp"), &mut NoProgress)
            .await
            .unwrap();
        assert!(!report.youtube_available);
        assert!(report.drive_available);
    }
}
