//! Dense all-to-all scenario

use clap::Args;
use connbench_kernel::{Kernel, SynapseModel};
use tracing::info;

use super::KernelArgs;
use crate::config::BenchConfig;
use crate::error::HarnessResult;
use crate::report::RunReport;

/// Dense command arguments; unset values come from the config file
#[derive(Args, Debug, Default)]
pub struct DenseCommand {
    #[command(flatten)]
    pub kernel: KernelArgs,

    /// Neuron model
    #[arg(long)]
    pub model: Option<String>,

    /// Population size
    #[arg(short = 'n', long)]
    pub units: Option<usize>,

    /// Synapse model name
    #[arg(long)]
    pub synapse_model: Option<String>,

    /// Query by source only, without the synapse model filter
    #[arg(long)]
    pub no_model_filter: bool,
}

impl DenseCommand {
    /// Run the dense scenario on a fresh kernel
    pub fn execute(self, config: &BenchConfig) -> HarnessResult<RunReport> {
        let mut scenario = config.dense.clone();
        self.kernel.apply(&mut scenario.kernel);
        if let Some(model) = self.model {
            scenario.model = model;
        }
        if let Some(units) = self.units {
            scenario.units = units;
        }
        if let Some(name) = &self.synapse_model {
            scenario.synapse.synapse_model = SynapseModel::lookup(name)?;
        }
        if self.no_model_filter {
            scenario.filter_by_model = false;
        }

        info!(
            "Dense scenario: {} x {} on {} thread(s)",
            scenario.units, scenario.model, scenario.kernel.local_num_threads
        );
        let mut kernel = Kernel::new(scenario.kernel.clone())?;
        scenario.run(&mut kernel)
    }
}
