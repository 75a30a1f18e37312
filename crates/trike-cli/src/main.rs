use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trike_cli::commands::{
    clear, export, extend, history, import, open_tracker, start, status, stderr_notifier, stop,
    suggest, util, watch,
};
use trike_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let now = Utc::now();
    let mut tracker = open_tracker(&config, stderr_notifier, Local)?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Start { activity, at } => {
            let at = util::resolve_at(at.as_deref(), now)?;
            start::run(&mut stdout, &mut tracker, *activity, at)?;
        }
        Commands::Stop { at } => {
            let at = util::resolve_at(at.as_deref(), now)?;
            stop::run(&mut stdout, &mut tracker, at)?;
        }
        Commands::Status { json } => {
            status::run(&mut stdout, &tracker, now, *json)?;
        }
        Commands::History { csv, limit } => {
            history::run(&mut stdout, tracker.ledger(), tracker.tz(), *csv, *limit)?;
        }
        Commands::Clear => {
            clear::run(&mut stdout, &mut tracker)?;
        }
        Commands::Extend => {
            extend::run(&mut stdout, &mut tracker, now)?;
        }
        Commands::Suggest { accept } => {
            suggest::run(
                &mut stdout,
                &mut tracker,
                config.suggestion_threshold(),
                *accept,
                now,
            )?;
        }
        Commands::Watch { interval } => {
            let period = interval.map_or_else(
                || config.tick_period(),
                |secs| std::time::Duration::from_secs(secs.max(1)),
            );
            let ctrl_c = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            watch::run(
                &mut stdout,
                &mut tracker,
                period,
                config.suggestion_threshold(),
                ctrl_c,
            )?;
        }
        Commands::Export => {
            export::run(&mut stdout, tracker.ledger())?;
        }
        Commands::Import { file } => {
            import::run(&mut stdout, &mut tracker, file)?;
        }
    }

    stdout.flush()?;
    Ok(())
}
