//! Doctor command - verify API key, endpoints and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::validation::{check_api_key, validate_url, ApiKeyCheck, API_KEY_PREFIX};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("learnpath Doctor");
    println!();
    println!("Checking API key, endpoints and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_check = check_google_api_key(std::env::var("GOOGLE_API_KEY").ok().as_deref());
    api_check.print();
    checks.push(api_check);
    Output::kv("model", &settings.model.name);
    Output::kv("api base", &settings.model.api_base);

    println!();

    println!("{}", style("MCP Endpoints").bold());
    let endpoint_checks = check_endpoints(settings);
    for check in &endpoint_checks {
        check.print();
    }
    checks.extend(endpoint_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using learnpath.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! learnpath is ready to use.");
    }

    Ok(())
}

/// Check the Google AI Studio API key.
fn check_google_api_key(key: Option<&str>) -> CheckResult {
    const NAME: &str = "GOOGLE_API_KEY";
    let hint = format!("Set with: export GOOGLE_API_KEY='{}...'", API_KEY_PREFIX);

    match (check_api_key(key), key) {
        (ApiKeyCheck::Ok, Some(key)) if key.len() > 12 && key.is_ascii() => {
            let masked = format!("{}...{}", &key[..6], &key[key.len() - 4..]);
            CheckResult::ok(NAME, &format!("configured ({})", masked))
        }
        (ApiKeyCheck::Ok, _) => CheckResult::ok(NAME, "configured"),
        (ApiKeyCheck::BadPrefix, _) => CheckResult::error(
            NAME,
            &format!("does not start with '{}'", API_KEY_PREFIX),
            "Create a key at https://aistudio.google.com/apikey",
        ),
        (ApiKeyCheck::Missing, _) => CheckResult::warning(
            NAME,
            "not set",
            &format!("{} (or pass --api-key)", hint),
        ),
    }
}

/// Check the configured endpoint defaults.
fn check_endpoints(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(match settings.endpoints.youtube_url.as_deref() {
        None => CheckResult::warning(
            "YouTube",
            "no default endpoint",
            "Pass --youtube-url or run: learnpath config set endpoints.youtube_url <url>",
        ),
        Some(url) if validate_url(url) => CheckResult::ok("YouTube", url),
        Some(url) => CheckResult::error(
            "YouTube",
            &format!("invalid URL: {}", url),
            "Expected an http(s) MCP server URL",
        ),
    });

    for (name, url) in [
        ("Google Drive", settings.endpoints.drive_url.as_deref()),
        ("Notion", settings.endpoints.notion_url.as_deref()),
    ] {
        results.push(match url {
            None => CheckResult::ok(name, "not configured"),
            Some(url) if validate_url(url) => CheckResult::ok(name, url),
            Some(url) => CheckResult::warning(
                name,
                &format!("invalid URL: {}", url),
                "This integration will be skipped",
            ),
        });
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: learnpath config edit",
        )
    }
}
