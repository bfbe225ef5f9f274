//! Clipsmith CLI
//!
//! Command-line interface for the Clipsmith audio toolkit.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};

use clipsmith::cli::{commands, Cli, Commands};
use clipsmith::config::Settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Clipsmith v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    debug!("Settings: {:?}", settings);

    match cli.command {
        Some(cmd) => handle_command(&settings, cmd),
        None => {
            println!("Clipsmith v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(settings: &Settings, cmd: Commands) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::Info { input } => commands::info(&input),
        Commands::Clip {
            input,
            start,
            end,
            output,
            encode,
        } => commands::clip(settings, &input, start, end, &output, &encode),
        Commands::Clips {
            input,
            ranges,
            output,
            encode,
        } => commands::clips(settings, &input, &ranges, &output, &encode),
        Commands::Merge {
            inputs,
            dir,
            output,
            encode,
        } => commands::merge(settings, &inputs, dir.as_deref(), &output, &encode),
        Commands::Toolkit {
            input,
            output,
            threshold_db,
            padding,
            keep_silence,
            no_normalize,
            speed,
            encode,
        } => commands::toolkit(
            settings,
            &input,
            &output,
            threshold_db,
            padding,
            keep_silence,
            no_normalize,
            speed,
            &encode,
        ),
    };

    if let Err(err) = &result {
        error!("[{}] {}", err.error_code(), err);
        for suggestion in err.recovery_suggestions() {
            eprintln!("  hint: {}", suggestion);
        }
    }

    result.context("command failed")
}
