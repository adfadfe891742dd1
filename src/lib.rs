//! learnpath - Learning paths from MCP-backed agents
//!
//! A CLI tool and library that turns a learning goal into a day-wise study plan
//! by running a tool-calling model against the user's MCP servers.
//!
//! # Overview
//!
//! learnpath allows you to:
//! - Register a YouTube MCP server plus an optional Google Drive or Notion server
//! - See which capabilities those servers expose, grouped by integration
//! - Generate a learning path whose resources come from those tools
//! - Serve the same operations over a small HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `validation` - Form and endpoint validation
//! - `mcp` - Streamable HTTP MCP client
//! - `capability` - Capability discovery, classification and negotiation
//! - `llm` - OpenAI-compatible chat model access
//! - `agent` - Tool-calling agent loop
//! - `prompt` - Template selection and rendering
//! - `progress` - Run state machine and progress reporting
//! - `generator` - End-to-end learning path generation
//!
//! # Example
//!
//! ```rust,no_run
//! use learnpath::capability::EndpointSet;
//! use learnpath::config::Settings;
//! use learnpath::generator::{GenerationRequest, LearningPathGenerator};
//! use learnpath::progress::{NoProgress, RunContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let generator = LearningPathGenerator::from_settings(&settings, "AIza...")?;
//!
//!     let endpoints = EndpointSet {
//!         youtube_url: Some("https://mcp.pipedream.net/xyz/youtube".to_string()),
//!         ..Default::default()
//!     };
//!     let request = GenerationRequest::new("I want to learn Python basics in 3 days", endpoints);
//!
//!     let mut ctx = RunContext::new();
//!     let result = generator.generate(&request, &mut ctx, &mut NoProgress).await?;
//!     println!("{}", result.learning_path());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod mcp;
pub mod progress;
pub mod prompt;
pub mod validation;

pub use error::{LearnPathError, Result};
