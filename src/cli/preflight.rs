//! Pre-flight checks before expensive operations.
//!
//! Validates the form input up front so a run never starts with a missing key
//! or a malformed YouTube endpoint.

use crate::error::{LearnPathError, Result};
use crate::validation::{validate_form, validate_url, FormInput};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Generation requires an API key, a YouTube endpoint and a goal.
    Generate,
    /// Listing tools only requires a YouTube endpoint.
    Tools,
}

/// Run pre-flight checks for the given operation.
///
/// Every problem is reported at once, joined into one configuration error.
pub fn check(operation: Operation, input: &FormInput<'_>) -> Result<()> {
    let errors = match operation {
        Operation::Generate => validate_form(input),
        Operation::Tools => match input.youtube_url.filter(|u| !u.is_empty()) {
            None => vec!["YouTube URL is required (use --youtube-url or endpoints.youtube_url)".to_string()],
            Some(url) if !validate_url(url) => vec!["Invalid YouTube URL format".to_string()],
            Some(_) => Vec::new(),
        },
    };

    if errors.is_empty() {
        Ok(())
    } else {
        Err(LearnPathError::Config(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_needs_only_youtube() {
        let input = FormInput {
            youtube_url: Some("https://yt.example.com/mcp"),
            ..FormInput::default()
        };
        assert!(check(Operation::Tools, &input).is_ok());
        assert!(check(Operation::Generate, &input).is_err());
    }

    #[test]
    fn test_generate_reports_every_problem() {
        let err = check(Operation::Generate, &FormInput::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("API key"));
        assert!(message.contains("YouTube URL is required"));
        assert!(message.contains("learning goal"));
    }
}
