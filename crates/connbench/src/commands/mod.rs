//! CLI command implementations for connbench

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use connbench_kernel::{KernelConfig, Verbosity};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{BenchConfig, ScenarioKind};
use crate::error::HarnessResult;
use crate::report::RunReport;

pub mod dense;
pub mod offset_chain;

/// connbench - timed network construction and connection query benchmarks
#[derive(Parser, Debug)]
#[command(
    name = "connbench",
    version,
    about = "Time network construction and connection queries",
    long_about = "connbench drives an in-process simulation kernel through a create, connect, \
                  simulate and query workload, timing every phase and validating the \
                  extracted connection attributes against the wiring pattern."
)]
pub struct ConnbenchCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(long, global = true)]
    pub json: Option<PathBuf>,

    /// Scenario to run (defaults to the configured one, normally offset-chain)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available scenarios
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pairwise i -> i+offset chain, simulated, with repeated extraction trials
    #[command(alias = "chain")]
    OffsetChain(offset_chain::OffsetChainCommand),

    /// All-to-all population queried by source and synapse model
    Dense(dense::DenseCommand),
}

/// Kernel option overrides shared by every scenario
#[derive(Args, Debug, Default, Clone)]
pub struct KernelArgs {
    /// Worker threads
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Simulation resolution (ms)
    #[arg(long)]
    pub resolution: Option<f64>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Kernel verbosity (M_ALL .. M_QUIET)
    #[arg(long)]
    pub verbosity: Option<Verbosity>,

    /// Log simulation progress
    #[arg(long)]
    pub print_time: bool,
}

impl KernelArgs {
    /// Overlay the given flags on `config`
    pub fn apply(&self, config: &mut KernelConfig) {
        if let Some(threads) = self.threads {
            config.local_num_threads = threads;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        if self.print_time {
            config.print_time = true;
        }
    }
}

impl ConnbenchCli {
    /// Execute the selected scenario, print its report and optionally save it
    pub fn execute(self) -> HarnessResult<RunReport> {
        let config = BenchConfig::load(self.config.as_deref())?;

        let command = self.command.unwrap_or(match config.default_scenario {
            ScenarioKind::Dense => Commands::Dense(Default::default()),
            ScenarioKind::OffsetChain => Commands::OffsetChain(Default::default()),
        });

        let report = match command {
            Commands::OffsetChain(cmd) => cmd.execute(&config)?,
            Commands::Dense(cmd) => cmd.execute(&config)?,
        };

        print!("{}", report);

        if let Some(path) = &self.json {
            write_json(&report, path)?;
        }

        Ok(report)
    }
}

fn write_json(report: &RunReport, path: &Path) -> HarnessResult<()> {
    let json = report.to_json()?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
