//! Generate command implementation.

use super::resolve_endpoints;
use crate::cli::preflight::{self, Operation};
use crate::cli::{EndpointArgs, Output};
use crate::config::Settings;
use crate::error::LearnPathError;
use crate::generator::{GenerationRequest, LearningPathGenerator};
use crate::progress::{ProgressSink, ProgressUpdate, RunContext};
use crate::validation::FormInput;
use anyhow::Result;
use console::style;
use indicatif::ProgressBar;

/// Progress sink drawing on an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressSink for BarProgress {
    fn notify(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn update(&mut self, message: &str, update: ProgressUpdate) {
        if update.section_changed {
            self.bar.println(format!("{} {}", style(update.section).cyan().bold(), message));
        }
        self.bar.set_position((update.fraction * 100.0).round() as u64);
        self.bar.set_message(message.to_string());
    }
}

/// Run the generate command.
pub async fn run_generate(
    goal: &str,
    api_key: Option<String>,
    endpoints: &EndpointArgs,
    model: Option<String>,
    output: Option<String>,
    json: bool,
    mut settings: Settings,
) -> Result<()> {
    let endpoints = resolve_endpoints(endpoints, &settings);

    // Pre-flight checks
    let input = FormInput {
        api_key: api_key.as_deref(),
        youtube_url: endpoints.youtube_url.as_deref(),
        goal: Some(goal),
    };
    if let Err(e) = preflight::check(Operation::Generate, &input) {
        Output::error(&format!("{}", e));
        Output::info("Run 'learnpath doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    let api_key = api_key.unwrap_or_default();

    if let Some(model) = model {
        settings.model.name = model;
    }

    let generator = LearningPathGenerator::from_settings(&settings, &api_key)?;
    let request = GenerationRequest::new(goal, endpoints);

    let mut progress = BarProgress {
        bar: Output::progress_bar(100, "Starting..."),
    };
    let mut ctx = RunContext::new();

    let result = match generator.generate(&request, &mut ctx, &mut progress).await {
        Ok(result) => {
            progress.bar.finish_and_clear();
            result
        }
        Err(e) => {
            progress.bar.abandon();
            Output::error(&format!("Generation failed: {}", e));
            if let LearnPathError::Provider { errors, .. } = &e {
                for error in errors {
                    Output::kv("error", error);
                }
            }
            return Err(e.into());
        }
    };

    let learning_path = result.learning_path();

    if let Some(path) = output {
        let path = Settings::expand_path(&path);
        std::fs::write(&path, &learning_path)?;
        Output::success(&format!("Saved learning path to {}", path.display()));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    Output::header("Your Learning Path");
    println!("\n{}", learning_path.trim_end());

    if !result.tool_calls.is_empty() {
        Output::header(&format!("Tool calls ({})", result.tool_calls.len()));
        for call in &result.tool_calls {
            Output::tool_call(call);
        }
    }

    println!();
    Output::kv("Mode", result.template.announcement().trim_end_matches("..."));
    Output::kv("Tools", &result.status_report.available_tools.join(", "));
    Output::kv("Run", &result.run_id.to_string());
    Output::success("Learning path generation complete!");

    Ok(())
}
