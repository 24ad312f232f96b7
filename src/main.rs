//! ConcatX CLI
//!
//! Joins video clips with transitions while re-encoding only the transition
//! regions.
//!
//! # Usage
//!
//! ```bash
//! concatx join -i a.mp4 -i b.mp4 -i c.mp4 -o joined.mp4 --transition fade:1000
//! concatx plan -i a.mp4 -i b.mp4 --transitions wipeleft:500 --json
//! concatx probe -i a.mp4 -i b.mp4
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use concatx_cli::app::DefaultAppContainer;
use concatx_cli::cli::{commands, Cli, Commands};
use concatx_cli::config::AppConfig;
use concatx_cli::utils::logging::{init_logging, LogFormat, LoggingConfig};

/// Main entry point for the ConcatX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, source) =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    commands::apply_overrides(&mut config, &cli)?;

    init_logging(&LoggingConfig {
        level: config.log_level,
        format: if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty },
        target: false,
    });
    source.log();

    let container = DefaultAppContainer::new(&config);

    match cli.command {
        Commands::Join(args) => {
            info!("Executing join command");
            commands::join(&container, &config, args).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(&container, &config, args).await?;
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            commands::probe(&container, args).await?;
        }
    }

    Ok(())
}
