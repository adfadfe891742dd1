//! Prompt templates for learnpath.
//!
//! Prompts can be customized by placing a `learning_path.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Example learning goals shown by `learnpath examples` and `GET /examples`.
pub const EXAMPLE_GOALS: &[&str] = &[
    "I want to learn Python basics in 3 days",
    "I want to learn data science fundamentals in 10 days",
    "I want to learn web development with React in 2 weeks",
    "I want to learn machine learning basics in 5 days",
    "I want to learn JavaScript for beginners in 7 days",
    "I want to learn SQL database management in 4 days",
];

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub learning_path: LearningPathPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Instruction templates handed to the agent.
///
/// `full` is used when a document-creation capability (Drive or Notion) was detected,
/// `primary_only` otherwise. Both may reference `{{goal}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPathPrompts {
    pub full: String,
    pub primary_only: String,
}

impl Default for LearningPathPrompts {
    fn default() -> Self {
        Self {
            full: r#"User Goal: {{goal}}

Main Instruction: You are an expert learning path generator that creates comprehensive, day-wise learning paths. You will be given a user goal and must generate a structured learning experience using the available tools.

## Available Tools
- YouTube: video search, playlist creation and video recommendations
- Google Drive: document creation and storage (if configured)
- Notion: page creation and organization (if configured)

## Execution Flow

### Phase 1: Planning & Research
1. Analyze the goal: learning objective, timeframe and complexity
2. Plan a logical day-wise progression of topics
3. Search YouTube for high-quality videos for each topic
4. Pick the best core video for each day

### Phase 2: Content Creation
5. Write the learning path with daily objectives, video links, practice exercises, progress checkpoints and additional resources

### Phase 3: Tool Integration
6. Document creation (Drive or Notion, whichever is available):
   - Create one document or page containing the whole learning path
   - Use proper headers, clickable video links, exercises and resources
7. YouTube playlist creation:
   - Create a public playlist with a relevant title
   - Add the core videos in learning order and write a description

### Phase 4: Review
8. Check the progression, the links and the progress-tracking methods

## Output Format
# Learning Path: [Topic Name]

## Overview
- **Goal**: [User's learning goal]
- **Duration**: [X days]
- **Difficulty**: [Beginner/Intermediate/Advanced]

## Daily Breakdown

### Day 1: [Topic Name]
**Learning Objectives:**
- [Objective]

**Core Video:** [Video Title] - [URL]
**Additional Videos:**
- [Video Title] - [URL]

**Practice Exercise:**
[Exercise]

**Progress Check:**
[How to measure progress for this day]

[Continue for each day...]

## Additional Resources
- **Recommended Channels:** [Channels]
- **Practice Projects:** [Projects]
- **Further Learning:** [Advanced topics]

Finish by sharing the link of the created document and playlist.

## Error Handling
- If a tool fails, continue with the remaining tools
- If video search fails, try alternative search terms
- If document creation fails, return the formatted text instead
- Always provide value even with limited tools"#
                .to_string(),

            primary_only: r#"User Goal: {{goal}}

Since document creation tools are not available, please create a comprehensive learning path with the following:

1. **Day-wise Learning Structure**: Break down the learning goal into manageable daily topics
2. **YouTube Video Recommendations**: For each day, recommend 2-3 high-quality YouTube videos
3. **Learning Objectives**: Clear objectives for each day
4. **Practice Suggestions**: Simple exercises or projects for each day
5. **Progress Tracking**: How to measure progress for each day

Format the response as:
# Learning Path: [Topic]

## Day 1: [Topic]
**Learning Objectives:**
- [Objective 1]
- [Objective 2]

**Recommended Videos:**
1. [Video Title] - [URL]
2. [Video Title] - [URL]

**Practice Exercise:**
[Description of what to practice]

[Continue for each day...]

**Additional Resources:**
- [Recommended channels/websites]"#
                .to_string(),
        }
    }
}

fn placeholder_regex() -> &'static regex::Regex {
    static PLACEHOLDER: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PLACEHOLDER.get_or_init(|| regex::Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"))
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let learning_path = custom_path.join("learning_path.toml");
            if learning_path.exists() {
                let content = std::fs::read_to_string(&learning_path)?;
                prompts.learning_path = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in one pass over the template, so substituted
    /// values are never scanned again. Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &regex::Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
