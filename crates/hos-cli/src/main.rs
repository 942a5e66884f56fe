use std::io::BufWriter;
use std::io::stdout;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hos_cli::commands::{certs, events, report};
use hos_cli::{Cli, Commands, Config};

/// Load config, preferring an explicit path over the default locations.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Report {
            events: batches,
            driver,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let stdout = stdout();
            let mut writer = BufWriter::new(stdout.lock());
            report::run(&mut writer, &config, batches, driver.as_deref(), *json)?;
        }
        Some(Commands::Certs {
            events: batches,
            certs: cert_batches,
            driver,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let stdout = stdout();
            let mut writer = BufWriter::new(stdout.lock());
            certs::run(
                &mut writer,
                &config,
                batches,
                cert_batches,
                driver.as_deref(),
                *json,
            )?;
        }
        Some(Commands::Events {
            events: batches,
            driver,
        }) => {
            // Events doesn't need config - just normalizes files to stdout
            let stdout = stdout();
            let mut writer = BufWriter::new(stdout.lock());
            events::run(&mut writer, batches, driver.as_deref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
