//! Instruction template selection.

use crate::capability::AvailabilityReport;
use crate::config::Prompts;
use serde::Serialize;
use std::collections::HashMap;

/// Which instruction template a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    /// Curate videos and write the result into a Drive document or Notion page.
    Full,
    /// Curate videos only.
    PrimaryOnly,
}

impl PromptTemplate {
    /// Progress message announcing the chosen mode.
    pub fn announcement(&self) -> &'static str {
        match self {
            PromptTemplate::Full => "Using full learning path generation with document creation...",
            PromptTemplate::PrimaryOnly => "Using YouTube-only learning path generation...",
        }
    }
}

/// `Full` when any document-creation capability was found, `PrimaryOnly` otherwise.
pub fn select_template(report: &AvailabilityReport) -> PromptTemplate {
    if report.drive_available || report.notion_available {
        PromptTemplate::Full
    } else {
        PromptTemplate::PrimaryOnly
    }
}

/// Render the chosen template for a goal.
pub fn render(template: PromptTemplate, goal: &str, prompts: &Prompts) -> String {
    let text = match template {
        PromptTemplate::Full => &prompts.learning_path.full,
        PromptTemplate::PrimaryOnly => &prompts.learning_path.primary_only,
    };
    let mut vars = HashMap::new();
    vars.insert("goal".to_string(), goal.to_string());
    prompts.render_with_custom(text, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(youtube: bool, drive: bool, notion: bool) -> AvailabilityReport {
        AvailabilityReport {
            youtube_available: youtube,
            drive_available: drive,
            notion_available: notion,
            ..AvailabilityReport::default()
        }
    }

    #[test]
    fn test_selection() {
        assert_eq!(select_template(&report(true, false, false)), PromptTemplate::PrimaryOnly);
        assert_eq!(select_template(&report(false, false, false)), PromptTemplate::PrimaryOnly);
        assert_eq!(select_template(&report(true, true, false)), PromptTemplate::Full);
        assert_eq!(select_template(&report(false, false, true)), PromptTemplate::Full);
    }

    #[test]
    fn test_render_full_starts_with_goal() {
        let prompts = Prompts::default();
        let text = render(PromptTemplate::Full, "learn Rust in 5 days", &prompts);
        assert!(text.starts_with("User Goal: learn Rust in 5 days\n"));
        assert!(!text.contains("{{goal}}"));
    }

    #[test]
    fn test_goal_reaches_template_verbatim() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("audience".to_string(), "students".to_string());

        let goal = "learn {{audience}} templating";
        for _ in 0..50 {
            let text = render(PromptTemplate::Full, goal, &prompts);
            assert!(text.starts_with("User Goal: learn {{audience}} templating\n"));
        }
    }

    #[test]
    fn test_primary_only_has_no_document_instruction() {
        let prompts = Prompts::default();
        let text = render(PromptTemplate::PrimaryOnly, "learn SQL", &prompts);
        assert!(text.contains("learn SQL"));
        assert!(!text.contains("Google Drive"));
        assert!(!text.contains("Notion"));
    }
}
