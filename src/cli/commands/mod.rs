//! CLI command implementations.

mod config;
mod doctor;
mod examples;
mod generate;
mod serve;
mod tools;

pub use config::run_config;
pub use doctor::run_doctor;
pub use examples::run_examples;
pub use generate::run_generate;
pub use serve::run_serve;
pub use tools::run_tools;

use crate::capability::EndpointSet;
use crate::cli::EndpointArgs;
use crate::config::Settings;

/// Merge endpoint flags with the configured defaults.
///
/// Secondary endpoints come either all from the flags or all from settings,
/// so a flag for one integration never mixes with a configured other one.
fn resolve_endpoints(args: &EndpointArgs, settings: &Settings) -> EndpointSet {
    let youtube_url = settings.youtube_url_or(args.youtube_url.as_deref());

    let (drive_url, notion_url) = if args.drive_url.is_some() || args.notion_url.is_some() {
        (args.drive_url.clone(), args.notion_url.clone())
    } else {
        (
            settings.endpoints.drive_url.clone(),
            settings.endpoints.notion_url.clone(),
        )
    };

    EndpointSet {
        youtube_url,
        drive_url,
        notion_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configured_secondaries() {
        let mut settings = Settings::default();
        settings.endpoints.youtube_url = Some("https://yt.example.com".to_string());
        settings.endpoints.drive_url = Some("https://drive.example.com".to_string());

        let args = EndpointArgs {
            notion_url: Some("https://notion.example.com".to_string()),
            ..EndpointArgs::default()
        };
        let endpoints = resolve_endpoints(&args, &settings);
        assert_eq!(endpoints.youtube_url.as_deref(), Some("https://yt.example.com"));
        assert!(endpoints.drive_url.is_none());
        assert_eq!(endpoints.notion_url.as_deref(), Some("https://notion.example.com"));

        let endpoints = resolve_endpoints(&EndpointArgs::default(), &settings);
        assert_eq!(endpoints.drive_url.as_deref(), Some("https://drive.example.com"));
    }
}
