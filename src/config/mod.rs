//! Configuration module for learnpath.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{LearningPathPrompts, Prompts, EXAMPLE_GOALS};
pub use settings::{
    EndpointSettings, GeneralSettings, McpSettings, ModelSettings, PromptSettings, Settings,
};
