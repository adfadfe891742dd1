//! In-process streamable HTTP MCP server for tests.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

const SESSION_ID: &str = "fake-session-1";

/// Behaviour of the fake server.
#[derive(Clone, Default)]
pub struct FakeServer {
    pub tools: Vec<String>,
    /// Answer with `text/event-stream` instead of JSON.
    pub event_stream: bool,
    /// Tools per `tools/list` page; 0 means all on one page.
    pub page_size: usize,
    /// Return HTTP 500 for `tools/list`.
    pub fail_tools_list: bool,
}

/// Observations a test can assert on after the server ran.
#[derive(Default)]
pub struct FakeStats {
    pub requests: AtomicUsize,
    pub initialized_notified: AtomicBool,
    pub terminated: AtomicBool,
}

#[derive(Clone)]
struct FakeState {
    config: Arc<FakeServer>,
    stats: Arc<FakeStats>,
}

impl FakeServer {
    pub fn with_tools(tools: &[&str]) -> Self {
        Self {
            tools: tools.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Bind to an ephemeral local port and serve in the background.
    pub async fn spawn(self) -> (Url, Arc<FakeStats>) {
        let stats = Arc::new(FakeStats::default());
        let state = FakeState {
            config: Arc::new(self),
            stats: stats.clone(),
        };

        let app = Router::new()
            .route("/mcp", post(handle_post).delete(handle_delete))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Url::parse(&format!("http://{}/mcp", addr)).unwrap(), stats)
    }
}

async fn handle_post(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Response {
    state.stats.requests.fetch_add(1, Ordering::SeqCst);

    let method = message["method"].as_str().unwrap_or_default().to_string();
    let session = headers
        .get("Mcp-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if method != "initialize" && session.as_deref() != Some(SESSION_ID) {
        return (StatusCode::BAD_REQUEST, "missing session").into_response();
    }

    let Some(id) = message.get("id").cloned() else {
        if method == "notifications/initialized" {
            state.stats.initialized_notified.store(true, Ordering::SeqCst);
        }
        return StatusCode::ACCEPTED.into_response();
    };

    let result = match method.as_str() {
        "initialize" => json!({
            "protocolVersion": "2025-03-26",
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "fake", "version": "0.0.1" }
        }),
        "tools/list" => {
            if state.config.fail_tools_list {
                return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
            }
            list_page(&state.config, &message["params"])
        }
        "tools/call" => {
            let name = message["params"]["name"].as_str().unwrap_or_default();
            if name.starts_with("fail") {
                json!({ "content": [{ "type": "text", "text": "quota exceeded" }], "isError": true })
            } else {
                json!({ "content": [{ "type": "text", "text": format!("called {}", name) }] })
            }
        }
        other => {
            let body = json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("Method not found: {}", other) }
            });
            return Json(body).into_response();
        }
    };

    let body = json!({ "jsonrpc": "2.0", "id": id, "result": result });

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header("Mcp-Session-Id", SESSION_ID);
    if state.config.event_stream {
        let notice = json!({ "jsonrpc": "2.0", "method": "notifications/message", "params": {} });
        builder
            .header(header::CONTENT_TYPE, "text/event-stream")
            .body(Body::from(format!(
                "event: message\ndata: {}\n\nevent: message\ndata: {}\n\n",
                notice, body
            )))
            .unwrap()
    } else {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

fn list_page(config: &FakeServer, params: &Value) -> Value {
    let start = params["cursor"]
        .as_str()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(0);
    let size = if config.page_size == 0 {
        config.tools.len()
    } else {
        config.page_size
    };
    let end = (start + size).min(config.tools.len());

    let tools: Vec<Value> = config.tools[start..end]
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{} tool", name),
                "inputSchema": {
                    "$schema": "http://json-schema.org/draft-07/schema#",
                    "type": "object",
                    "properties": { "query": { "type": "string" } }
                }
            })
        })
        .collect();

    if end < config.tools.len() {
        json!({ "tools": tools, "nextCursor": end.to_string() })
    } else {
        json!({ "tools": tools })
    }
}

async fn handle_delete(State(state): State<FakeState>) -> StatusCode {
    state.stats.terminated.store(true, Ordering::SeqCst);
    StatusCode::OK
}
