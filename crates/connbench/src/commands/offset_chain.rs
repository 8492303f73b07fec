//! Offset chain scenario with repeated extraction trials

use clap::Args;
use connbench_kernel::Kernel;
use tracing::info;

use super::KernelArgs;
use crate::config::BenchConfig;
use crate::error::HarnessResult;
use crate::report::RunReport;

/// Offset chain arguments; unset values come from the config file
#[derive(Args, Debug, Default)]
pub struct OffsetChainCommand {
    #[command(flatten)]
    pub kernel: KernelArgs,

    /// Neuron model
    #[arg(long)]
    pub model: Option<String>,

    /// Population size
    #[arg(short = 'n', long)]
    pub units: Option<usize>,

    /// Number of pairwise connects
    #[arg(short, long)]
    pub edges: Option<usize>,

    /// Target index offset
    #[arg(long)]
    pub offset: Option<usize>,

    /// Extraction trials (must be even)
    #[arg(long)]
    pub trials: Option<usize>,

    /// Simulated time before querying (ms)
    #[arg(long)]
    pub simulate_ms: Option<f64>,
}

impl OffsetChainCommand {
    /// Run the offset chain on a fresh kernel
    pub fn execute(self, config: &BenchConfig) -> HarnessResult<RunReport> {
        let mut scenario = config.offset_chain.clone();
        self.kernel.apply(&mut scenario.kernel);
        if let Some(model) = self.model {
            scenario.model = model;
        }
        if let Some(units) = self.units {
            scenario.units = units;
        }
        if let Some(edges) = self.edges {
            scenario.edges = edges;
        }
        if let Some(offset) = self.offset {
            scenario.offset = offset;
        }
        if let Some(trials) = self.trials {
            scenario.trials = trials;
        }
        if let Some(ms) = self.simulate_ms {
            scenario.simulate_ms = ms;
        }
        scenario.validate()?;

        info!(
            "Offset chain: {} edges (+{}) over {} units, {} trials on {} thread(s)",
            scenario.edges,
            scenario.offset,
            scenario.units,
            scenario.trials,
            scenario.kernel.local_num_threads
        );
        let mut kernel = Kernel::new(scenario.kernel.clone())?;
        scenario.run(&mut kernel)
    }
}
