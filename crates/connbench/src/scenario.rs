//! Benchmark scenarios
//!
//! A scenario owns its parameters and drives any [`SimulationBackend`]
//! through the timed create / connect / query sequence, validating what the
//! backend returns along the way.

use crate::backend::SimulationBackend;
use crate::error::{HarnessError, HarnessResult};
use crate::harness::Harness;
use crate::report::RunReport;
use crate::validate;
use connbench_kernel::{
    Attribute, ConnectionFilter, ConnectionRule, ExtractionStrategy, KernelConfig, SynapseModel,
    SynapseSpec, Verbosity,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Attributes pulled in every offset-chain trial
pub const TRIAL_ATTRIBUTES: [Attribute; 3] = [Attribute::Source, Attribute::Target, Attribute::Weight];

/// Dense all-to-all population queried by source and synapse model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenseScenario {
    /// Backend options
    pub kernel: KernelConfig,
    /// Neuron model name
    pub model: String,
    /// Population size
    pub units: usize,
    /// Synapse applied to every edge
    pub synapse: SynapseSpec,
    /// Also filter the query by synapse model
    pub filter_by_model: bool,
}

impl Default for DenseScenario {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default()
                .with_threads(4)
                .with_verbosity(Verbosity::All)
                .with_print_time(true),
            model: "ht_neuron".to_string(),
            units: 500,
            synapse: SynapseSpec::new(SynapseModel::Stdp)
                .with_weight(1.0)
                .with_delay(1.0)
                .with_receptor(1),
            filter_by_model: true,
        }
    }
}

impl DenseScenario {
    /// Build, wire and query the population
    pub fn run<B: SimulationBackend>(&self, backend: &mut B) -> HarnessResult<RunReport> {
        let mut harness = Harness::new(backend);
        harness.configure(&self.kernel)?;

        let total = Instant::now();
        let neurons = harness.build_population(&self.model, self.units, None)?;
        harness.wire("Connect", &neurons, &neurons, &ConnectionRule::all_to_all(), &self.synapse)?;

        let mut filter = ConnectionFilter::all().with_sources(neurons);
        if self.filter_by_model {
            filter = filter.with_synapse_model(self.synapse.synapse_model);
        }
        let set = harness.query(&filter)?;
        let attrs = harness.extract("Conns.get", set, &[Attribute::Source], ExtractionStrategy::Standard)?;
        harness.record("Total", total.elapsed());

        let expected = self.units * self.units;
        validate::check_edge_count(&attrs, Attribute::Source, expected)?;
        info!("Dense run returned {} connections", expected);

        Ok(RunReport::new(
            "dense",
            self.kernel.local_num_threads,
            expected,
            &harness.into_timings(),
        ))
    }
}

/// Pairwise chain `i -> i + offset`, simulated, then extracted repeatedly with both strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetChainScenario {
    /// Backend options
    pub kernel: KernelConfig,
    /// Neuron model name
    pub model: String,
    /// Population size
    pub units: usize,
    /// Connect calls issued
    pub edges: usize,
    /// Index distance between source and target
    pub offset: usize,
    /// Edge `i` gets weight `i / weight_divisor`
    pub weight_divisor: f64,
    /// Synapse model, delay and receptor for every edge; its weight is ignored
    pub synapse: SynapseSpec,
    /// Simulated time before querying (ms); 0 skips the step
    pub simulate_ms: f64,
    /// Extraction trials; the first half use the custom path
    pub trials: usize,
}

impl Default for OffsetChainScenario {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default(),
            model: "ht_neuron".to_string(),
            units: 10_000,
            edges: 4000,
            offset: 100,
            weight_divisor: 10.0,
            synapse: SynapseSpec::new(SynapseModel::Stdp).with_delay(1.0).with_receptor(1),
            simulate_ms: 100.0,
            trials: 100,
        }
    }
}

impl OffsetChainScenario {
    /// Weight wired on edge `i`
    pub fn weight(&self, i: usize) -> f64 {
        i as f64 / self.weight_divisor
    }

    /// Check parameters that the backend cannot
    pub fn validate(&self) -> HarnessResult<()> {
        if self.trials % 2 != 0 {
            return Err(HarnessError::invalid_args(format!(
                "trials must be even to split between strategies, got {}",
                self.trials
            )));
        }
        if !(self.weight_divisor.is_finite() && self.weight_divisor != 0.0) {
            return Err(HarnessError::invalid_args(format!(
                "weight_divisor must be finite and non-zero, got {}",
                self.weight_divisor
            )));
        }
        Ok(())
    }

    /// Build the chain, simulate, then run every extraction trial
    pub fn run<B: SimulationBackend>(&self, backend: &mut B) -> HarnessResult<RunReport> {
        self.validate()?;

        let mut harness = Harness::new(backend);
        harness.configure(&self.kernel)?;

        let neurons = harness.build_population(&self.model, self.units, None)?;
        let pairs = (0..self.edges).map(|i| (i, i + self.offset, self.synapse.clone().with_weight(self.weight(i))));
        harness.wire_pairs("Connect", &neurons, pairs)?;
        info!("Connections created");

        if self.simulate_ms > 0.0 {
            harness.advance(self.simulate_ms)?;
        }

        let set = harness.query(&ConnectionFilter::all().with_sources(neurons))?;
        let reference = harness.extract("Conns.get", set, &TRIAL_ATTRIBUTES, ExtractionStrategy::Standard)?;
        self.check(&reference)?;

        let half = self.trials / 2;
        for trial in 0..self.trials {
            let strategy = ExtractionStrategy::from_custom_flag(trial < half);
            let attrs = harness.extract_trial(set, &TRIAL_ATTRIBUTES, strategy)?;
            self.check(&attrs)?;
            validate::check_identical(&reference, &attrs)?;
        }

        Ok(RunReport::new(
            "offset_chain",
            self.kernel.local_num_threads,
            self.edges,
            &harness.into_timings(),
        )
        .with_trial_run())
    }

    fn check(&self, attrs: &connbench_kernel::ConnectionAttributes) -> HarnessResult<()> {
        validate::check_lengths(attrs, &TRIAL_ATTRIBUTES)?;
        validate::check_edge_count(attrs, Attribute::Source, self.edges)?;
        validate::check_offset(attrs, self.offset as u64)?;
        validate::check_weights(attrs, |i| self.weight(i))
    }
}
