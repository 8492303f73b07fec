//! Fixed-step network dynamics

use crate::{
    error::*,
    ids::EdgeRef,
    models::SynapseModel,
    neuron::LIFNeuron,
    plasticity::{PlasticityRule, STDPParams, STDPRule},
    store::ConnectionStore,
};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::BTreeMap;
use std::time::Instant;

/// Outcome of one `simulate` call
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Steps executed
    pub steps: u64,
    /// Spikes emitted during the call
    pub spikes: u64,
    /// Biological time at the end of the call (ms)
    pub end_time_ms: f64,
    /// Wall-clock duration of the call (s)
    pub wall_secs: f64,
}

/// Outgoing and plastic-incoming edges per node slot
#[derive(Debug)]
struct Adjacency {
    built_for: usize,
    outgoing: Vec<Vec<EdgeRef>>,
    plastic_incoming: Vec<Vec<EdgeRef>>,
}

impl Adjacency {
    fn build(store: &ConnectionStore, nodes: usize) -> Self {
        let mut outgoing = vec![Vec::new(); nodes];
        let mut plastic_incoming = vec![Vec::new(); nodes];
        for (edge, conn) in store.iter() {
            outgoing[conn.source.slot()].push(edge);
            if conn.synapse_model == SynapseModel::Stdp {
                plastic_incoming[conn.target.slot()].push(edge);
            }
        }
        Self {
            built_for: store.len(),
            outgoing,
            plastic_incoming,
        }
    }
}

/// Dynamic state of the network owned by a kernel
#[derive(Debug)]
pub(crate) struct SimulationState {
    pub neurons: Vec<LIFNeuron>,
    pre_trace: Vec<f64>,
    post_trace: Vec<f64>,
    /// Pending synaptic input keyed by delivery step
    pending: BTreeMap<u64, Vec<(usize, f64)>>,
    pub step: u64,
    adjacency: Option<Adjacency>,
    rule: STDPRule,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            neurons: Vec::new(),
            pre_trace: Vec::new(),
            post_trace: Vec::new(),
            pending: BTreeMap::new(),
            step: 0,
            adjacency: None,
            rule: STDPRule {
                params: SynapseModel::Stdp.plasticity().unwrap_or_default(),
            },
        }
    }
}

impl SimulationState {
    /// Append a neuron
    pub fn push(&mut self, neuron: LIFNeuron) {
        self.neurons.push(neuron);
        self.pre_trace.push(0.0);
        self.post_trace.push(0.0);
        self.adjacency = None;
    }

    /// Replace the STDP parameters used by plastic connections
    pub fn set_plasticity(&mut self, params: STDPParams) -> Result<()> {
        self.rule = STDPRule::new(params)?;
        Ok(())
    }

    /// Run `steps` fixed steps of `dt_ms` on `pool`
    pub fn run(
        &mut self,
        store: &mut ConnectionStore,
        steps: u64,
        dt_ms: f64,
        print_time: bool,
        pool: &ThreadPool,
    ) -> Result<SimulationReport> {
        let started = Instant::now();
        let adjacency = match self.adjacency.take() {
            Some(adj) if adj.built_for == store.len() && adj.outgoing.len() == self.neurons.len() => adj,
            _ => Adjacency::build(store, self.neurons.len()),
        };

        let (pre_decay, post_decay) = self.rule.trace_decay(dt_ms);
        let first_step = self.step;
        let mut spikes = 0u64;

        for i in 0..steps {
            let step = first_step + i;

            if let Some(events) = self.pending.remove(&step) {
                for (slot, weight) in events {
                    let neuron = self.neurons.get_mut(slot).ok_or_else(|| {
                        KernelError::simulation_step(step as f64 * dt_ms, format!("no node in slot {}", slot))
                    })?;
                    neuron.receive_input(weight);
                }
            }

            let neurons = &mut self.neurons;
            let fired: Vec<usize> = pool.install(|| {
                neurons
                    .par_iter_mut()
                    .enumerate()
                    .filter_map(|(slot, neuron)| neuron.update(dt_ms, step).then_some(slot))
                    .collect()
            });

            self.pre_trace.iter_mut().for_each(|t| *t *= pre_decay);
            self.post_trace.iter_mut().for_each(|t| *t *= post_decay);

            for &slot in &fired {
                for &edge in &adjacency.outgoing[slot] {
                    let conn = store.get_mut(edge);
                    let target = conn.target.slot();
                    if conn.synapse_model == SynapseModel::Stdp {
                        conn.weight = self.rule.on_pre_spike(conn.weight, self.post_trace[target]);
                    }
                    let delay_steps = ((conn.delay / dt_ms).round() as u64).max(1);
                    self.pending
                        .entry(step + delay_steps)
                        .or_default()
                        .push((target, conn.weight));
                }
                for &edge in &adjacency.plastic_incoming[slot] {
                    let conn = store.get_mut(edge);
                    conn.weight = self.rule.on_post_spike(conn.weight, self.pre_trace[conn.source.slot()]);
                }
            }
            for &slot in &fired {
                self.pre_trace[slot] += 1.0;
                self.post_trace[slot] += 1.0;
            }
            spikes += fired.len() as u64;

            if print_time {
                if let Some(decile) = progress_decile(i + 1, steps) {
                    log::info!(
                        "Simulation progress: {}% ({:.1} ms)",
                        decile * 10,
                        (step + 1) as f64 * dt_ms
                    );
                }
            }
        }

        self.step = first_step + steps;
        self.adjacency = Some(adjacency);

        Ok(SimulationReport {
            steps,
            spikes,
            end_time_ms: self.step as f64 * dt_ms,
            wall_secs: started.elapsed().as_secs_f64(),
        })
    }
}

/// Decile first reached after `done` of `steps` steps, if any
///
/// Runs shorter than ten steps report nothing.
fn progress_decile(done: u64, steps: u64) -> Option<u64> {
    if steps < 10 || done == 0 || done > steps {
        return None;
    }
    let decile = |n: u64| (u128::from(n) * 10 / u128::from(steps)) as u64;
    let now = decile(done);
    (now > decile(done - 1)).then_some(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection::SynapseSpec, neuron::LIFParams, NodeId};
    use rayon::ThreadPoolBuilder;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn state(n: usize, driven: &[usize]) -> SimulationState {
        let mut state = SimulationState::default();
        for slot in 0..n {
            let mut params = LIFParams::default();
            if driven.contains(&slot) {
                params.i_e = 5.0;
            }
            state.push(LIFNeuron::new(params).unwrap());
        }
        state
    }

    #[test]
    fn test_progress_logs_each_decile_once() {
        for steps in [10u64, 15, 19, 1000, 1003, 1009] {
            let marks: Vec<u64> = (1..=steps).filter_map(|done| progress_decile(done, steps)).collect();
            assert_eq!(marks, (1..=10).collect::<Vec<_>>(), "steps = {}", steps);
        }
        assert_eq!(progress_decile(15, 15), Some(10));
        assert!((1..10).all(|done| progress_decile(done, 9).is_none()));
        assert_eq!(progress_decile(0, 100), None);
    }

    #[test]
    fn test_quiet_network_keeps_weights() {
        let mut state = state(4, &[]);
        let mut store = ConnectionStore::new(2);
        let spec = SynapseSpec::new(SynapseModel::Stdp).with_weight(3.5);
        store.insert(&[(NodeId::new(1), NodeId::new(2)), (NodeId::new(3), NodeId::new(4))], &spec);

        let report = state.run(&mut store, 1000, 0.1, false, &pool()).unwrap();
        assert_eq!(report.steps, 1000);
        assert_eq!(report.spikes, 0);
        assert!((report.end_time_ms - 100.0).abs() < 1e-9);
        assert!(store.iter().all(|(_, c)| c.weight == 3.5));
    }

    #[test]
    fn test_driven_neurons_update_plastic_weights() {
        // node 1 is driven and projects onto node 2, which is driven too
        let mut state = state(2, &[0, 1]);
        let mut store = ConnectionStore::new(1);
        let spec = SynapseSpec::new(SynapseModel::Stdp).with_weight(1.0);
        store.insert(&[(NodeId::new(1), NodeId::new(2))], &spec);

        let report = state.run(&mut store, 2000, 0.1, false, &pool()).unwrap();
        assert!(report.spikes > 0);
        let (_, conn) = store.iter().next().unwrap();
        assert_ne!(conn.weight, 1.0);
    }

    #[test]
    fn test_static_weights_never_change() {
        let mut state = state(2, &[0, 1]);
        let mut store = ConnectionStore::new(1);
        store.insert(
            &[(NodeId::new(1), NodeId::new(2))],
            &SynapseSpec::new(SynapseModel::Static).with_weight(1.0),
        );
        state.run(&mut store, 2000, 0.1, false, &pool()).unwrap();
        assert!(store.iter().all(|(_, c)| c.weight == 1.0));
    }

    #[test]
    fn test_time_accumulates_across_calls() {
        let mut state = state(1, &[]);
        let mut store = ConnectionStore::new(1);
        state.run(&mut store, 10, 0.1, false, &pool()).unwrap();
        let report = state.run(&mut store, 5, 0.1, false, &pool()).unwrap();
        assert_eq!(state.step, 15);
        assert!((report.end_time_ms - 1.5).abs() < 1e-9);
    }
}
