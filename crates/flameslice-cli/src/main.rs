use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flameslice_cli::commands::{counters, show, slice};
use flameslice_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON on stdout stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    match &cli.command {
        Some(Commands::Slice(args)) => slice::run(&mut writer, args, &config)?,
        Some(Commands::Show(args)) => show::run(&mut writer, args, &config)?,
        Some(Commands::Counters(args)) => counters::run(&mut writer, args)?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
