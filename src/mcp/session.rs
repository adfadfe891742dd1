//! A single MCP session over the streamable HTTP transport.
//!
//! Every client message is a POST of one JSON-RPC message. The server answers
//! with either `application/json` or a `text/event-stream`, may hand out an
//! `Mcp-Session-Id` during initialize, and expects that id on every later
//! request. Terminating the session is an HTTP DELETE.

use super::protocol::{
    decode_response, ClientInfo, InitializeParams, InitializeResult, JsonRpcNotification,
    JsonRpcRequest, ServerInfo, Tool, ToolCallParams, ToolCallResult, ToolsListResult,
};
use crate::error::{LearnPathError, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const SESSION_HEADER: &str = "Mcp-Session-Id";
const CLIENT_NAME: &str = "learnpath";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on `tools/list` pages, against servers that never stop paging.
const MAX_TOOL_PAGES: usize = 50;

/// An initialized MCP session with one server.
pub struct McpSession {
    http: reqwest::Client,
    endpoint: Url,
    session_id: Option<String>,
    server_info: Option<ServerInfo>,
    protocol_version: String,
    next_id: AtomicU64,
}

impl McpSession {
    /// Open a session: send `initialize`, then `notifications/initialized`.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn connect(
        http: reqwest::Client,
        endpoint: Url,
        protocol_version: &str,
    ) -> Result<Self> {
        let mut session = Self {
            http,
            endpoint,
            session_id: None,
            server_info: None,
            protocol_version: protocol_version.to_string(),
            next_id: AtomicU64::new(1),
        };

        let params = InitializeParams {
            protocol_version: protocol_version.to_string(),
            capabilities: json!({}),
            client_info: ClientInfo {
                name: CLIENT_NAME.to_string(),
                version: CLIENT_VERSION.to_string(),
            },
        };

        let (result, session_id) = session
            .exchange("initialize", Some(serde_json::to_value(params)?))
            .await?;
        session.session_id = session_id;
        let init: InitializeResult = serde_json::from_value(result)?;

        info!(
            "MCP session initialized with {} (protocol {}, session id {})",
            init.server_info
                .as_ref()
                .map(|s| s.name.as_str())
                .unwrap_or("unknown server"),
            init.protocol_version,
            if session.session_id.is_some() { "assigned" } else { "none" }
        );
        session.protocol_version = init.protocol_version;
        session.server_info = init.server_info;

        session.notify("notifications/initialized").await?;

        Ok(session)
    }

    /// The endpoint this session talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Session id assigned by the server, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Server name and version reported during initialize.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Protocol version negotiated during initialize.
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// List every tool the server exposes, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let result = self.request("tools/list", params).await?;
            let page: ToolsListResult = serde_json::from_value(result)?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        Err(LearnPathError::Mcp(format!(
            "tools/list did not finish after {} pages",
            MAX_TOOL_PAGES
        )))
    }

    /// Call a tool and return its result.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        let params = ToolCallParams {
            name: name.to_string(),
            arguments,
        };
        let result = self
            .request("tools/call", Some(serde_json::to_value(params)?))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Terminate the session. Servers may refuse with 405, which is not an error.
    pub async fn terminate(&self) -> Result<()> {
        let Some(session_id) = &self.session_id else {
            return Ok(());
        };

        let response = self
            .http
            .delete(self.endpoint.clone())
            .header(SESSION_HEADER, session_id)
            .send()
            .await?;

        debug!("MCP session terminate returned {}", response.status());
        Ok(())
    }

    /// Send a JSON-RPC request and wait for the matching response.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let (result, _) = self.exchange(method, params).await?;
        Ok(result)
    }

    /// Send a JSON-RPC request; returns the result and any session id header.
    async fn exchange(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<(Value, Option<String>)> {
        let id = Value::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let request = JsonRpcRequest::new(id.clone(), method, params);
        debug!("MCP -> {} {}", self.endpoint, method);

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&request);
        if let Some(session_id) = &self.session_id {
            builder = builder.header(SESSION_HEADER, session_id);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND && self.session_id.is_some() {
            return Err(LearnPathError::Mcp(format!(
                "session expired at {} (404)",
                self.endpoint
            )));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(LearnPathError::Mcp(format!(
                "{} returned {} for {}: {}",
                self.endpoint,
                status,
                method,
                truncate(&body, 200)
            )));
        }

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let body = response.text().await?;
        let result = decode_response(&body, is_event_stream, &id)?.into_result()?;
        Ok((result, session_id))
    }

    /// Send a JSON-RPC notification. The server answers 202 with no body.
    async fn notify(&self, method: &str) -> Result<()> {
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&JsonRpcNotification::new(method));
        if let Some(session_id) = &self.session_id {
            builder = builder.header(SESSION_HEADER, session_id);
        }

        let status = builder.send().await?.status();
        if !status.is_success() {
            return Err(LearnPathError::Mcp(format!(
                "{} rejected {} with {}",
                self.endpoint, method, status
            )));
        }
        Ok(())
    }
}

/// Build the HTTP client shared by all sessions of one run.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
