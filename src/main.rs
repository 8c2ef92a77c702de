//! Survey E2E - data-driven end-to-end tests for the survey app
//!
//! Drives the app's login and survey screens through an Appium server and
//! records whether each scenario behaved as expected.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use survey_e2e::{cli, commands, common::logging};

#[derive(Parser)]
#[command(name = "survey-e2e", about = "Data-driven Appium runner for the survey app")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Appium server URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Path to a config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also append logs to the run log in the data directory
    #[arg(long, global = true)]
    log_file: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; the guard flushes the log file on drop
    let _log_guard = logging::init_cli(cli.verbose, cli.log_file);

    let result = match cli::load_config(cli.config.as_deref()) {
        Ok(mut config) => {
            if let Some(server) = cli.server {
                config.server.url = server;
            }
            cli::dispatch(cli.command, config).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
