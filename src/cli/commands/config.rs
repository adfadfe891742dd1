//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::LearnPathError;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
///
/// `config_path` is the `-c` override; the default location is used otherwise.
pub fn run_config(action: &ConfigAction, mut settings: Settings, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            apply_setting(&mut settings, key, value)?;
            settings.save_to(&config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Set one dotted configuration key from its string value.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> crate::error::Result<()> {
    fn parse<T: std::str::FromStr>(key: &str, value: &str) -> crate::error::Result<T> {
        value
            .parse()
            .map_err(|_| LearnPathError::Config(format!("Invalid value for {}: {}", key, value)))
    }

    fn optional(value: &str) -> Option<String> {
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "model.name" => settings.model.name = value.to_string(),
        "model.api_base" => settings.model.api_base = value.to_string(),
        "model.temperature" => settings.model.temperature = parse(key, value)?,
        "model.max_tokens" => settings.model.max_tokens = parse(key, value)?,
        "model.recursion_limit" => settings.model.recursion_limit = parse(key, value)?,
        "model.timeout_seconds" => settings.model.timeout_seconds = parse(key, value)?,
        "endpoints.youtube_url" => settings.endpoints.youtube_url = optional(value),
        "endpoints.drive_url" => settings.endpoints.drive_url = optional(value),
        "endpoints.notion_url" => settings.endpoints.notion_url = optional(value),
        "mcp.timeout_seconds" => settings.mcp.timeout_seconds = parse(key, value)?,
        "mcp.protocol_version" => settings.mcp.protocol_version = value.to_string(),
        "prompts.custom_dir" => settings.prompts.custom_dir = optional(value),
        other => {
            return Err(LearnPathError::Config(format!("Unknown configuration key: {}", other)));
        }
    }
    Ok(())
}
