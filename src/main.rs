//! Layerfade CLI
//!
//! Command-line interface for checking and simulating layered music scenes.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use layerfade::cli::{commands, Cli, Commands};
use layerfade::LayerFadeError;

fn main() {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Layerfade v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = handle_command(cli.command) {
        error!("{:#}", err);

        // Startup failures leave layers out of sync; never continue past them
        let exit_code = match err.downcast_ref::<LayerFadeError>() {
            Some(inner) => {
                for suggestion in inner.recovery_suggestions() {
                    eprintln!("  hint: {}", suggestion);
                }
                if inner.is_fatal() {
                    2
                } else {
                    1
                }
            }
            None => 1,
        };
        std::process::exit(exit_code);
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::InitConfig { path, force } => commands::init_config(&path, force)
            .with_context(|| format!("writing configuration to {}", path.display())),
        Commands::Check { config, assets } => commands::check(config.as_deref(), &assets)
            .with_context(|| format!("checking layers in {}", assets.display())),
        Commands::Simulate {
            config,
            assets,
            dt,
            seconds,
            triggers,
            json,
        } => commands::simulate(
            config.as_deref(),
            assets.as_deref(),
            &triggers,
            dt,
            seconds,
            json,
        )
        .context("simulation failed"),
    }
}
