//! Multi-server MCP client.
//!
//! One client serves a whole registration request. Sessions are opened
//! lazily, one server at a time, and every listed tool remembers which server
//! exposed it so calls are routed back there.

use super::session::{http_client, McpSession};
use crate::capability::{
    BucketKey, Capability, CapabilityProvider, ProviderConnector, RegistrationRequest,
};
use crate::error::{LearnPathError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// MCP client over every endpoint of a registration request.
pub struct MultiServerClient {
    http: reqwest::Client,
    protocol_version: String,
    endpoints: Vec<(BucketKey, Url)>,
    sessions: Mutex<HashMap<BucketKey, Arc<McpSession>>>,
    routes: Mutex<HashMap<String, BucketKey>>,
}

impl MultiServerClient {
    pub fn new(request: &RegistrationRequest, http: reqwest::Client, protocol_version: &str) -> Self {
        Self {
            http,
            protocol_version: protocol_version.to_string(),
            endpoints: request.iter().map(|(key, d)| (key, d.url.clone())).collect(),
            sessions: Mutex::new(HashMap::new()),
            routes: Mutex::new(HashMap::new()),
        }
    }

    /// Registered servers in key order.
    pub fn servers(&self) -> Vec<BucketKey> {
        self.endpoints.iter().map(|(key, _)| *key).collect()
    }

    async fn session(&self, key: BucketKey) -> Result<Arc<McpSession>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(&key) {
            return Ok(session.clone());
        }

        let url = self
            .endpoints
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, url)| url.clone())
            .ok_or_else(|| LearnPathError::Mcp(format!("No {} server registered", key)))?;

        let session = Arc::new(McpSession::connect(self.http.clone(), url, &self.protocol_version).await?);
        sessions.insert(key, session.clone());
        Ok(session)
    }
}

#[async_trait]
impl CapabilityProvider for MultiServerClient {
    async fn list_capabilities(&self) -> Result<Vec<Capability>> {
        let mut capabilities = Vec::new();

        for (key, _) in &self.endpoints {
            let session = self.session(*key).await?;
            let tools = session.list_tools().await?;
            info!("{} server exposes {} tools", key, tools.len());

            let mut routes = self.routes.lock().await;
            for tool in tools {
                if let Some(previous) = routes.insert(tool.name.clone(), *key) {
                    debug!("Tool {} also exposed by {}, routing to {}", tool.name, previous, key);
                }
                capabilities.push(Capability {
                    name: tool.name,
                    description: tool.description,
                    input_schema: tool.input_schema,
                    server: *key,
                });
            }
        }

        Ok(capabilities)
    }

    async fn call_capability(&self, name: &str, arguments: Value) -> Result<String> {
        let key = self
            .routes
            .lock()
            .await
            .get(name)
            .copied()
            .ok_or_else(|| LearnPathError::Mcp(format!("Unknown tool: {}", name)))?;

        let session = self.session(key).await?;
        let result = session.call_tool(name, arguments).await?;
        let text = result.text();

        if result.is_error.unwrap_or(false) {
            return Err(LearnPathError::Mcp(format!("{} failed: {}", name, text)));
        }
        Ok(text)
    }

    /// Terminate every open session. Failures are logged and skipped.
    async fn close(&self) {
        let sessions: Vec<(BucketKey, Arc<McpSession>)> =
            self.sessions.lock().await.drain().collect();
        for (key, session) in sessions {
            if let Err(e) = session.terminate().await {
                warn!("Failed to terminate {} session: {}", key, e);
            }
        }
    }
}

/// Connector that builds a [`MultiServerClient`] for each request.
#[derive(Clone)]
pub struct McpConnector {
    http: reqwest::Client,
    protocol_version: String,
}

impl McpConnector {
    pub fn new(timeout: Duration, protocol_version: &str) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            protocol_version: protocol_version.to_string(),
        })
    }

    /// Build a connector from the `[mcp]` settings section.
    pub fn from_settings(settings: &crate::config::McpSettings) -> Result<Self> {
        Self::new(Duration::from_secs(settings.timeout_seconds), &settings.protocol_version)
    }

    /// Build a client for one registration request.
    pub fn client(&self, request: &RegistrationRequest) -> MultiServerClient {
        MultiServerClient::new(request, self.http.clone(), &self.protocol_version)
    }
}

impl ProviderConnector for McpConnector {
    fn connect(&self, request: &RegistrationRequest) -> Result<Arc<dyn CapabilityProvider>> {
        Ok(Arc::new(self.client(request)))
    }
}
