//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for capability inspection and learning path generation.

use crate::capability::{AvailabilityReport, CapabilityNegotiator, EndpointSet};
use crate::cli::Output;
use crate::config::{Settings, EXAMPLE_GOALS};
use crate::error::LearnPathError;
use crate::generator::{GenerationRequest, LearningPathGenerator};
use crate::mcp::McpConnector;
use crate::progress::{NoProgress, RunContext};
use crate::validation::{validate_form, FormInput};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state. Read-only; every request builds its own run context.
struct AppState {
    settings: Settings,
    /// Key used when a request does not carry one.
    api_key: Option<String>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        settings,
        api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
    });

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("learnpath API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Examples", "GET  /examples");
    Output::kv("Tools", "POST /tools");
    Output::kv("Generate", "POST /generate");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/examples", get(examples))
        .route("/tools", post(tools))
        .route("/generate", post(generate))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize, Default)]
struct EndpointsRequest {
    #[serde(default)]
    youtube_url: Option<String>,
    #[serde(default)]
    drive_url: Option<String>,
    #[serde(default)]
    notion_url: Option<String>,
}

impl EndpointsRequest {
    /// Request values, falling back to the configured defaults.
    fn resolve(self, settings: &Settings) -> EndpointSet {
        let explicit_secondary = self.drive_url.is_some() || self.notion_url.is_some();
        EndpointSet {
            youtube_url: settings.youtube_url_or(self.youtube_url.as_deref()),
            drive_url: if explicit_secondary {
                self.drive_url
            } else {
                settings.endpoints.drive_url.clone()
            },
            notion_url: if explicit_secondary {
                self.notion_url
            } else {
                settings.endpoints.notion_url.clone()
            },
        }
    }
}

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    goal: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(flatten)]
    endpoints: EndpointsRequest,
}

#[derive(Serialize)]
struct GenerateResponse {
    run_id: String,
    learning_path: String,
    messages: Vec<crate::agent::AgentMessage>,
    tool_calls: Vec<crate::agent::ToolCallRecord>,
    status_report: AvailabilityReport,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Map a library error to an HTTP response.
fn error_response(e: LearnPathError) -> Response {
    let status = match &e {
        e if e.is_config() => StatusCode::BAD_REQUEST,
        LearnPathError::Provider { .. }
        | LearnPathError::Mcp(_)
        | LearnPathError::Agent(_)
        | LearnPathError::Model(_)
        | LearnPathError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let errors = match &e {
        LearnPathError::Provider { errors, .. } => errors.clone(),
        _ => Vec::new(),
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            errors,
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn examples() -> impl IntoResponse {
    Json(EXAMPLE_GOALS)
}

async fn tools(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EndpointsRequest>,
) -> Response {
    let endpoints = req.resolve(&state.settings);

    let connector = match McpConnector::from_settings(&state.settings.mcp) {
        Ok(connector) => connector,
        Err(e) => return error_response(e),
    };
    let negotiator = CapabilityNegotiator::new(Arc::new(connector));

    match negotiator.inspect(&endpoints, &mut NoProgress).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let api_key = req.api_key.clone().or_else(|| state.api_key.clone());
    let endpoints = req.endpoints.resolve(&state.settings);

    let problems = validate_form(&FormInput {
        api_key: api_key.as_deref(),
        youtube_url: endpoints.youtube_url.as_deref(),
        goal: Some(&req.goal),
    });
    if !problems.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid request".to_string(),
                errors: problems,
            }),
        )
            .into_response();
    }

    let generator =
        match LearningPathGenerator::from_settings(&state.settings, api_key.as_deref().unwrap_or_default()) {
            Ok(generator) => generator,
            Err(e) => return error_response(e),
        };

    let request = GenerationRequest::new(&req.goal, endpoints);
    let mut ctx = RunContext::new();
    let mut progress = |message: &str| info!("{}", message);

    match generator.generate(&request, &mut ctx, &mut progress).await {
        Ok(result) => Json(GenerateResponse {
            run_id: result.run_id.to_string(),
            learning_path: result.learning_path(),
            messages: result.messages,
            tool_calls: result.tool_calls,
            status_report: result.status_report,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_app(settings: Settings, api_key: Option<&str>) -> String {
        let state = Arc::new(AppState {
            settings,
            api_key: api_key.map(str::to_string),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_and_examples() {
        let base = spawn_app(Settings::default(), None).await;
        let client = reqwest::Client::new();

        let health: serde_json::Value = client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        let examples: Vec<String> = client
            .get(format!("{}/examples", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(examples.len(), EXAMPLE_GOALS.len());
    }

    #[tokio::test]
    async fn test_generate_validation_is_bad_request() {
        let base = spawn_app(Settings::default(), None).await;
        let response = reqwest::Client::new()
            .post(format!("{}/generate", base))
            .json(&serde_json::json!({ "goal": "" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_tools_with_bad_youtube_url() {
        let base = spawn_app(Settings::default(), None).await;
        for url in ["youtube", "http://999.999.999.999/mcp"] {
            let response = reqwest::Client::new()
                .post(format!("{}/tools", base))
                .json(&serde_json::json!({ "youtube_url": url }))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "{}", url);
        }
    }

    #[test]
    fn test_provider_error_maps_to_bad_gateway() {
        let response = error_response(LearnPathError::Provider {
            message: "down".to_string(),
            errors: vec!["Error in capability negotiation: down".to_string()],
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            error_response(LearnPathError::Config("bad".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
