//! CLI module for learnpath.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Args, Parser, Subcommand};

/// learnpath - AI learning path generator
///
/// Turns a learning goal into a day-wise plan of YouTube videos, optionally
/// written into a Google Drive document or a Notion page, by letting a Gemini
/// agent drive remote MCP servers.
#[derive(Parser, Debug)]
#[command(name = "learnpath")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// MCP endpoint flags shared by `generate` and `tools`.
///
/// At most one secondary integration (Drive or Notion) can be given.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// YouTube MCP server URL (defaults to `endpoints.youtube_url`)
    #[arg(long)]
    pub youtube_url: Option<String>,

    /// Google Drive MCP server URL
    #[arg(long, conflicts_with = "notion_url")]
    pub drive_url: Option<String>,

    /// Notion MCP server URL
    #[arg(long)]
    pub notion_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a learning path for a goal
    Generate {
        /// The learning goal, e.g. "I want to learn Python basics in 3 days"
        goal: String,

        /// Google AI Studio API key
        #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        #[command(flatten)]
        endpoints: EndpointArgs,

        /// Model to use instead of `model.name`
        #[arg(short, long)]
        model: Option<String>,

        /// Write the learning path to a file as well
        #[arg(short, long)]
        output: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which capabilities the configured MCP servers expose
    Tools {
        #[command(flatten)]
        endpoints: EndpointArgs,
    },

    /// List example learning goals
    Examples,

    /// Check API key, endpoints and configuration
    Doctor,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "endpoints.youtube_url")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "learnpath",
            "generate",
            "I want to learn SQL in 4 days",
            "--api-key",
            "AIzaTest",
            "--youtube-url",
            "https://yt.example.com/mcp",
            "--notion-url",
            "https://notion.example.com/mcp",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate { goal, endpoints, api_key, .. } => {
                assert_eq!(goal, "I want to learn SQL in 4 days");
                assert_eq!(api_key.as_deref(), Some("AIzaTest"));
                assert_eq!(endpoints.notion_url.as_deref(), Some("https://notion.example.com/mcp"));
                assert!(endpoints.drive_url.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_drive_and_notion_conflict() {
        let result = Cli::try_parse_from([
            "learnpath",
            "tools",
            "--drive-url",
            "https://drive.example.com/mcp",
            "--notion-url",
            "https://notion.example.com/mcp",
        ]);
        assert!(result.is_err());
    }
}
