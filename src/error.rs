//! Error types for learnpath.

use thiserror::Error;

/// Library-level error type for learnpath operations.
#[derive(Error, Debug)]
pub enum LearnPathError {
    /// Bad or missing mandatory configuration. Terminal, raised before any external call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The capability provider failed while being queried.
    ///
    /// `errors` is the availability report's error list at the time of failure.
    #[error("Capability provider error: {message}")]
    Provider { message: String, errors: Vec<String> },

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Model API error: {0}")]
    Model(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl LearnPathError {
    /// Whether this error was raised by configuration validation rather than an external call.
    pub fn is_config(&self) -> bool {
        matches!(self, LearnPathError::Config(_) | LearnPathError::InvalidInput(_))
    }
}

/// Result type alias for learnpath operations.
pub type Result<T> = std::result::Result<T, LearnPathError>;
