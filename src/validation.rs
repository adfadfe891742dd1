//! Input validation for endpoints, API keys and the generation form.

use regex::Regex;
use std::sync::OnceLock;

/// Prefix that Google AI Studio API keys start with.
pub const API_KEY_PREFIX: &str = "AI";

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| {
        Regex::new(
            r"(?xi)
            ^https?://
            (?:
                # domain name
                (?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?
                |
                localhost
                |
                # IPv4 address
                \d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}
            )
            (?::\d+)?
            (?:/?|[/?]\S+)$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Check whether a URL is a well-formed http(s) endpoint.
///
/// The pattern admits some hosts and ports that are out of range, so the URL
/// must also parse.
pub fn validate_url(url: &str) -> bool {
    !url.is_empty() && url_regex().is_match(url) && url::Url::parse(url).is_ok()
}

/// Result of checking an API key's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyCheck {
    Missing,
    BadPrefix,
    Ok,
}

/// Check an API key for presence and the expected prefix.
pub fn check_api_key(key: Option<&str>) -> ApiKeyCheck {
    match key.map(str::trim) {
        None | Some("") => ApiKeyCheck::Missing,
        Some(k) if !k.starts_with(API_KEY_PREFIX) => ApiKeyCheck::BadPrefix,
        Some(_) => ApiKeyCheck::Ok,
    }
}

/// Raw form input for a generation run, before any external call.
#[derive(Debug, Clone, Default)]
pub struct FormInput<'a> {
    pub api_key: Option<&'a str>,
    pub youtube_url: Option<&'a str>,
    pub goal: Option<&'a str>,
}

/// Collect every problem with the form input.
///
/// Returns an empty list when the run may start. Optional endpoints are not
/// checked here: an invalid optional endpoint is treated as not configured.
pub fn validate_form(input: &FormInput<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    match check_api_key(input.api_key) {
        ApiKeyCheck::Missing => errors.push("Please enter your Google AI Studio API key".to_string()),
        ApiKeyCheck::BadPrefix => errors.push(format!(
            "Invalid API key format (expected a key starting with '{}')",
            API_KEY_PREFIX
        )),
        ApiKeyCheck::Ok => {}
    }

    match input.youtube_url.filter(|u| !u.is_empty()) {
        None => errors.push("YouTube URL is required".to_string()),
        Some(url) if !validate_url(url) => errors.push("Invalid YouTube URL format".to_string()),
        Some(_) => {}
    }

    if input.goal.map(str::trim).unwrap_or_default().is_empty() {
        errors.push("Please enter your learning goal".to_string());
    }

    errors
}
