//! Tools command - show which capabilities the MCP servers expose.

use super::resolve_endpoints;
use crate::capability::CapabilityNegotiator;
use crate::cli::preflight::{self, Operation};
use crate::cli::{EndpointArgs, Output};
use crate::config::Settings;
use crate::mcp::McpConnector;
use crate::prompt::select_template;
use crate::validation::FormInput;
use anyhow::Result;
use std::sync::Arc;

/// Run the tools command.
pub async fn run_tools(endpoints: &EndpointArgs, settings: Settings) -> Result<()> {
    let endpoints = resolve_endpoints(endpoints, &settings);

    let input = FormInput {
        youtube_url: endpoints.youtube_url.as_deref(),
        ..FormInput::default()
    };
    if let Err(e) = preflight::check(Operation::Tools, &input) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let connector = McpConnector::from_settings(&settings.mcp)?;
    let negotiator = CapabilityNegotiator::new(Arc::new(connector));

    let spinner = Output::spinner("Querying MCP servers...");
    let mut progress = |message: &str| spinner.set_message(message.to_string());

    let report = match negotiator.inspect(&endpoints, &mut progress).await {
        Ok(report) => {
            spinner.finish_and_clear();
            report
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    Output::header("Capabilities");
    println!();
    Output::availability(&report);
    println!();
    Output::info(select_template(&report).announcement());

    Ok(())
}
