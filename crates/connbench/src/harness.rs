//! Timed calls into a simulation backend

use crate::backend::SimulationBackend;
use crate::error::HarnessResult;
use crate::timing::TimingRecord;
use connbench_kernel::{
    Attribute, ConnectionAttributes, ConnectionFilter, ConnectionRule, ConnectionSetId,
    ExtractionStrategy, KernelConfig, NodeCollection, ParamMap, SynapseSpec,
};
use std::time::{Duration, Instant};
use tracing::debug;

/// Drives one backend session and records how long each call takes.
///
/// Calls are issued one at a time. A failed call is not recorded and its
/// error is returned unchanged.
pub struct Harness<'b, B: SimulationBackend> {
    backend: &'b mut B,
    timings: TimingRecord,
}

impl<'b, B: SimulationBackend> Harness<'b, B> {
    /// Wrap `backend` with an empty timing record
    pub fn new(backend: &'b mut B) -> Self {
        Self {
            backend,
            timings: TimingRecord::new(),
        }
    }

    fn timed<T>(
        &mut self,
        label: &str,
        call: impl FnOnce(&mut B) -> connbench_kernel::Result<T>,
    ) -> HarnessResult<(T, Duration)> {
        let start = Instant::now();
        let out = call(&mut *self.backend)?;
        let elapsed = start.elapsed();
        debug!("{}: {:.6} s", label, elapsed.as_secs_f64());
        Ok((out, elapsed))
    }

    fn phase<T>(
        &mut self,
        label: &str,
        call: impl FnOnce(&mut B) -> connbench_kernel::Result<T>,
    ) -> HarnessResult<T> {
        let (out, elapsed) = self.timed(label, call)?;
        self.timings.record(label, elapsed);
        Ok(out)
    }

    /// Apply backend options ("Configure")
    pub fn configure(&mut self, config: &KernelConfig) -> HarnessResult<()> {
        self.phase("Configure", |b| b.configure(config))
    }

    /// Create `count` units of `model` ("Create")
    pub fn build_population(
        &mut self,
        model: &str,
        count: usize,
        params: Option<&ParamMap>,
    ) -> HarnessResult<NodeCollection> {
        self.phase("Create", |b| b.create(model, count, params))
    }

    /// One connect call, recorded as `label`
    pub fn wire(
        &mut self,
        label: &str,
        pre: &NodeCollection,
        post: &NodeCollection,
        rule: &ConnectionRule,
        syn: &SynapseSpec,
    ) -> HarnessResult<()> {
        self.phase(label, |b| b.connect(pre, post, rule, syn))
    }

    /// Single-unit connects `population[i] -> population[j]`, recorded together as `label`
    pub fn wire_pairs<I>(&mut self, label: &str, population: &NodeCollection, pairs: I) -> HarnessResult<usize>
    where
        I: IntoIterator<Item = (usize, usize, SynapseSpec)>,
    {
        let rule = ConnectionRule::all_to_all();
        self.phase(label, |b| {
            let mut count = 0;
            for (i, j, syn) in pairs {
                b.connect(&population.at(i)?, &population.at(j)?, &rule, &syn)?;
                count += 1;
            }
            Ok(count)
        })
    }

    /// Integrate dynamics for `duration` ms ("Simulate")
    pub fn advance(&mut self, duration: f64) -> HarnessResult<()> {
        self.phase("Simulate", |b| b.simulate(duration))
    }

    /// Select connections ("GetConnections")
    pub fn query(&mut self, filter: &ConnectionFilter) -> HarnessResult<ConnectionSetId> {
        self.phase("GetConnections", |b| b.get_connections(filter))
    }

    /// One extraction, recorded as a phase named `label`
    pub fn extract(
        &mut self,
        label: &str,
        set: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> HarnessResult<ConnectionAttributes> {
        self.phase(label, |b| b.get(set, attrs, strategy))
    }

    /// One extraction, recorded in the trial bucket for `strategy`
    pub fn extract_trial(
        &mut self,
        set: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> HarnessResult<ConnectionAttributes> {
        let label = if strategy.is_custom() { "custom trial" } else { "standard trial" };
        let (out, elapsed) = self.timed(label, |b| b.get(set, attrs, strategy))?;
        self.timings.record_trial(strategy, elapsed);
        Ok(out)
    }

    /// Record a phase measured outside the backend calls
    pub fn record(&mut self, label: &str, elapsed: Duration) {
        self.timings.record(label, elapsed);
    }

    /// Timings recorded so far
    pub fn timings(&self) -> &TimingRecord {
        &self.timings
    }

    /// Finish the run and hand back its timings
    pub fn into_timings(self) -> TimingRecord {
        self.timings
    }
}
