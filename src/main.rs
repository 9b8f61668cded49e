//! Caramel CLI entry point.

use anyhow::Result;
use caramel::cli::{commands, Cli, Commands};
use caramel::config::Settings;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in a .env file next to where the command is run
    let dotenv_path = dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;
    let settings = cli.apply_overrides(settings);

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("caramel={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Some(path) = &dotenv_path {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Execute command
    match &cli.command {
        Commands::Ask { prompt } => {
            commands::run_ask(prompt.clone(), settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Summarize { file } => {
            commands::run_summarize(file.clone(), settings).await?;
        }

        Commands::Stocks { tickers, json } => {
            commands::run_stocks(tickers, *json, settings).await?;
        }

        Commands::Agent {
            tickers,
            max_iterations,
            ..
        } => {
            commands::run_agent(tickers.clone(), *max_iterations, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(config_path, dotenv_path.as_deref(), &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
