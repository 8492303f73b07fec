//! Explicitly owned simulation session

use crate::{
    config::{KernelConfig, Verbosity},
    connection::{ConnectionRule, SynapseSpec},
    error::*,
    ids::ConnectionSetId,
    models::{self, SynapseModel},
    neuron::{LIFNeuron, ParamMap},
    nodes::NodeCollection,
    plasticity::STDPParams,
    query::{Attribute, ConnectionAttributes, ConnectionFilter, ConnectionSet, ExtractionStrategy},
    simulation::{SimulationReport, SimulationState},
    store::ConnectionStore,
    NodeId,
};
use core::fmt;
use rand::{rngs::StdRng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Snapshot of kernel state
#[derive(Debug, Clone, PartialEq)]
pub struct KernelStatus {
    /// Worker threads
    pub local_num_threads: usize,
    /// Time step (ms)
    pub resolution: f64,
    /// RNG seed
    pub rng_seed: u64,
    /// Number of created nodes
    pub network_size: usize,
    /// Number of stored connections
    pub num_connections: usize,
    /// Biological time (ms)
    pub biological_time: f64,
    /// Live connection sets
    pub connection_sets: usize,
}

/// A simulation session.
///
/// Every kernel owns its configuration, worker pool, node table, connection
/// table and query results; nothing is shared between instances.
pub struct Kernel {
    config: KernelConfig,
    pool: ThreadPool,
    rng: StdRng,
    generation: u32,
    node_models: Vec<&'static str>,
    state: SimulationState,
    store: ConnectionStore,
    connection_sets: Vec<Option<ConnectionSet>>,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.config)
            .field("generation", &self.generation)
            .field("network_size", &self.node_models.len())
            .field("num_connections", &self.store.len())
            .finish()
    }
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("connbench-vp{}", i))
        .build()
        .map_err(|e| KernelError::ThreadPool { reason: e.to_string() })
}

impl Kernel {
    /// Create a kernel with `config`
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate()?;
        let pool = build_pool(config.local_num_threads)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.rng_seed),
            store: ConnectionStore::new(config.local_num_threads),
            pool,
            config,
            generation: 0,
            node_models: Vec::new(),
            state: SimulationState::default(),
            connection_sets: Vec::new(),
        })
    }

    /// Current configuration
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn notify(&self, level: Verbosity, message: fmt::Arguments<'_>) {
        if level >= self.config.verbosity && self.config.verbosity != Verbosity::Quiet {
            log::log!(level.log_level(), "{}", message);
        }
    }

    /// Apply a new configuration.
    ///
    /// The resolution is locked once nodes exist and the thread count once
    /// connections exist. The RNG is reseeded every time.
    pub fn set_config(&mut self, config: KernelConfig) -> Result<()> {
        config.validate()?;
        if config.resolution != self.config.resolution && !self.node_models.is_empty() {
            return Err(KernelError::invalid_config(
                "resolution cannot change after nodes have been created",
            ));
        }
        if config.local_num_threads != self.config.local_num_threads {
            if !self.store.is_empty() {
                return Err(KernelError::invalid_config(
                    "local_num_threads cannot change after connections have been created",
                ));
            }
            self.pool = build_pool(config.local_num_threads)?;
            self.store = ConnectionStore::new(config.local_num_threads);
        }
        self.rng = StdRng::seed_from_u64(config.rng_seed);
        self.config = config;
        self.notify(
            Verbosity::Info,
            format_args!(
                "Kernel configured: {} thread(s), resolution {} ms, seed {}",
                self.config.local_num_threads, self.config.resolution, self.config.rng_seed
            ),
        );
        Ok(())
    }

    /// Drop all nodes, connections, query results and time; keep the configuration.
    ///
    /// Connection set handles issued before the reset become stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.node_models.clear();
        self.state = SimulationState::default();
        self.store = ConnectionStore::new(self.config.local_num_threads);
        self.connection_sets.clear();
        self.rng = StdRng::seed_from_u64(self.config.rng_seed);
        self.notify(Verbosity::Info, format_args!("Kernel reset"));
    }

    /// Create `count` nodes of `model`, optionally overriding parameters
    pub fn create(&mut self, model: &str, count: usize, params: Option<&ParamMap>) -> Result<NodeCollection> {
        let preset = models::neuron_model(model)?;
        if count == 0 {
            return Err(KernelError::invalid_parameter("n", "0", "> 0"));
        }
        let node_params = match params {
            Some(overrides) => preset.params.with_overrides(overrides)?,
            None => preset.params.clone(),
        };

        let first = NodeId::from_slot(self.node_models.len());
        self.state.neurons.reserve(count);
        for _ in 0..count {
            self.state.push(LIFNeuron::new(node_params.clone())?);
            self.node_models.push(preset.name);
        }
        self.notify(
            Verbosity::All,
            format_args!("Created {} {} node(s) starting at {}", count, preset.name, first),
        );
        Ok(NodeCollection::new(first, count))
    }

    fn check_collection(&self, nodes: &NodeCollection) -> Result<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        if nodes.first().raw() == 0 {
            return Err(KernelError::NodeNotFound {
                node_id: 0,
                network_size: self.node_models.len(),
            });
        }
        let last = nodes.last();
        if last.slot() >= self.node_models.len() {
            return Err(KernelError::NodeNotFound {
                node_id: last.raw(),
                network_size: self.node_models.len(),
            });
        }
        Ok(())
    }

    /// Connect `pre` to `post` following `rule`, creating edges with `syn`
    pub fn connect(
        &mut self,
        pre: &NodeCollection,
        post: &NodeCollection,
        rule: &ConnectionRule,
        syn: &SynapseSpec,
    ) -> Result<usize> {
        self.check_collection(pre)?;
        self.check_collection(post)?;
        syn.validate(self.config.resolution)?;
        for target in post.iter() {
            let receptors = models::neuron_model(self.node_models[target.slot()])?.receptors;
            if !receptors.contains(&syn.receptor_type) {
                return Err(KernelError::invalid_parameter(
                    "receptor_type",
                    syn.receptor_type.to_string(),
                    format!(
                        "{}..={} for {}",
                        receptors.start(),
                        receptors.end(),
                        self.node_models[target.slot()]
                    ),
                ));
            }
        }

        let pairs = rule.expand(pre, post, &mut self.rng)?;
        let store = &mut self.store;
        let created = self.pool.install(|| store.insert(&pairs, syn));
        self.notify(
            Verbosity::All,
            format_args!("Connected {} edge(s) with rule {} ({})", created, rule.name(), syn.synapse_model),
        );
        Ok(created)
    }

    /// Replace the parameters of `stdp_synapse`
    pub fn set_stdp_params(&mut self, params: STDPParams) -> Result<()> {
        self.state.set_plasticity(params)
    }

    /// Advance the network by `duration` ms
    pub fn simulate(&mut self, duration: f64) -> Result<SimulationReport> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(KernelError::invalid_parameter(
                "duration",
                duration.to_string(),
                "finite and >= 0.0",
            ));
        }
        let steps = (duration / self.config.resolution).round() as u64;
        self.notify(
            Verbosity::Info,
            format_args!("Simulating {} ms ({} steps)", duration, steps),
        );
        let report = self.state.run(
            &mut self.store,
            steps,
            self.config.resolution,
            self.config.print_time,
            &self.pool,
        )?;
        self.notify(
            Verbosity::Info,
            format_args!(
                "Simulation finished: {} spike(s), t = {} ms, {:.3} s wall",
                report.spikes, report.end_time_ms, report.wall_secs
            ),
        );
        Ok(report)
    }

    /// Run a query and keep its result in the kernel; returns the handle
    pub fn get_connections(&mut self, filter: &ConnectionFilter) -> Result<ConnectionSetId> {
        if let Some(sources) = &filter.sources {
            self.check_collection(sources)?;
        }
        if let Some(targets) = &filter.targets {
            self.check_collection(targets)?;
        }
        let store = &self.store;
        let set = self.pool.install(|| ConnectionSet::select(store, filter));
        let slot = match self.connection_sets.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                self.connection_sets.push(None);
                self.connection_sets.len() - 1
            }
        };
        let index = u32::try_from(slot)
            .map_err(|_| KernelError::invalid_config("too many live connection sets"))?;
        self.notify(
            Verbosity::All,
            format_args!("Query matched {} connection(s)", set.len()),
        );
        self.connection_sets[slot] = Some(set);
        Ok(ConnectionSetId::new(self.generation, index))
    }

    fn connection_set(&self, handle: ConnectionSetId) -> Result<&ConnectionSet> {
        if handle.generation != self.generation {
            return Err(KernelError::UnknownConnectionSet { handle: handle.to_string() });
        }
        self.connection_sets
            .get(handle.index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| KernelError::UnknownConnectionSet { handle: handle.to_string() })
    }

    /// Free the connection set behind `handle`
    ///
    /// The slot is handed to the next query, so a released handle may later
    /// resolve to that newer set.
    pub fn release(&mut self, handle: ConnectionSetId) -> Result<()> {
        self.connection_set(handle)?;
        self.connection_sets[handle.index as usize] = None;
        Ok(())
    }

    /// Number of connections behind `handle`
    pub fn connection_count(&self, handle: ConnectionSetId) -> Result<usize> {
        Ok(self.connection_set(handle)?.len())
    }

    /// Extract `attrs` (all when empty) for every connection behind `handle`
    pub fn get(
        &self,
        handle: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> Result<ConnectionAttributes> {
        let set = self.connection_set(handle)?;
        let store = &self.store;
        Ok(self.pool.install(|| set.extract(store, attrs, strategy)))
    }

    /// Look up a synapse model by name
    pub fn synapse_model(&self, name: &str) -> Result<SynapseModel> {
        SynapseModel::lookup(name)
    }

    /// Current kernel status
    pub fn status(&self) -> KernelStatus {
        KernelStatus {
            local_num_threads: self.config.local_num_threads,
            resolution: self.config.resolution,
            rng_seed: self.config.rng_seed,
            network_size: self.node_models.len(),
            num_connections: self.store.len(),
            biological_time: self.state.step as f64 * self.config.resolution,
            connection_sets: self.connection_sets.iter().filter(|s| s.is_some()).count(),
        }
    }
}
