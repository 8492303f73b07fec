//! The call surface the harness drives

use connbench_kernel::{
    Attribute, ConnectionAttributes, ConnectionFilter, ConnectionRule, ConnectionSetId,
    ExtractionStrategy, Kernel, KernelConfig, NodeCollection, ParamMap, Result, SynapseSpec,
};

/// A stateful simulation backend.
///
/// Every call blocks until the backend is done; errors are returned as-is.
pub trait SimulationBackend {
    /// Apply backend-wide options
    fn configure(&mut self, config: &KernelConfig) -> Result<()>;

    /// Create `count` units of `model`
    fn create(&mut self, model: &str, count: usize, params: Option<&ParamMap>) -> Result<NodeCollection>;

    /// Create edges from `pre` to `post` according to `rule`
    fn connect(
        &mut self,
        pre: &NodeCollection,
        post: &NodeCollection,
        rule: &ConnectionRule,
        syn: &SynapseSpec,
    ) -> Result<()>;

    /// Advance dynamics by `duration` ms
    fn simulate(&mut self, duration: f64) -> Result<()>;

    /// Select connections matching `filter`
    fn get_connections(&mut self, filter: &ConnectionFilter) -> Result<ConnectionSetId>;

    /// Extract per-edge values for `attrs`
    fn get(
        &self,
        set: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> Result<ConnectionAttributes>;
}

impl SimulationBackend for Kernel {
    fn configure(&mut self, config: &KernelConfig) -> Result<()> {
        self.set_config(config.clone())
    }

    fn create(&mut self, model: &str, count: usize, params: Option<&ParamMap>) -> Result<NodeCollection> {
        Kernel::create(self, model, count, params)
    }

    fn connect(
        &mut self,
        pre: &NodeCollection,
        post: &NodeCollection,
        rule: &ConnectionRule,
        syn: &SynapseSpec,
    ) -> Result<()> {
        Kernel::connect(self, pre, post, rule, syn).map(|_| ())
    }

    fn simulate(&mut self, duration: f64) -> Result<()> {
        let report = Kernel::simulate(self, duration)?;
        tracing::debug!(
            "Simulated {} steps, {} spikes, t = {:.1} ms",
            report.steps,
            report.spikes,
            report.end_time_ms
        );
        Ok(())
    }

    fn get_connections(&mut self, filter: &ConnectionFilter) -> Result<ConnectionSetId> {
        Kernel::get_connections(self, filter)
    }

    fn get(
        &self,
        set: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> Result<ConnectionAttributes> {
        Kernel::get(self, set, attrs, strategy)
    }
}
