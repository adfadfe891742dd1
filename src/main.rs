//! learnpath CLI entry point.

use anyhow::Result;
use clap::Parser;
use learnpath::cli::{commands, Cli, Commands};
use learnpath::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("learnpath={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Generate {
            goal,
            api_key,
            endpoints,
            model,
            output,
            json,
        } => {
            commands::run_generate(
                goal,
                api_key.clone(),
                endpoints,
                model.clone(),
                output.clone(),
                *json,
                settings,
            )
            .await?;
        }

        Commands::Tools { endpoints } => {
            commands::run_tools(endpoints, settings).await?;
        }

        Commands::Examples => {
            commands::run_examples();
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
