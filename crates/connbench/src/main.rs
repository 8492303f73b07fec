//! # connbench
//!
//! Command line entry point: installs logging, parses arguments and runs
//! the selected benchmark scenario.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use connbench::{ConnbenchCli, MODULE_PATH_ENV};
use connbench_kernel::KERNEL_VERSION;

fn main() {
    // Parse CLI arguments
    let cli = ConnbenchCli::parse();

    // Initialize logging with environment variable support
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("connbench kernel {}", KERNEL_VERSION);
    match std::env::var(MODULE_PATH_ENV) {
        Ok(path) => info!("{}: {}", MODULE_PATH_ENV, path),
        Err(_) => info!("{} not set", MODULE_PATH_ENV),
    }

    // Execute the scenario
    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
