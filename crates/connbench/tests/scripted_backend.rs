use connbench::scenario::TRIAL_ATTRIBUTES;
use connbench::{DenseScenario, HarnessError, OffsetChainScenario, SimulationBackend};
use connbench_kernel::{
    Attribute, AttributeColumn, ConnectionAttributes, ConnectionFilter, ConnectionRule,
    ConnectionSetId, ExtractionStrategy, KernelConfig, KernelError, NodeCollection, NodeId,
    ParamMap, Result, SynapseSpec,
};

/// In-memory backend that records every call and can be told to misbehave
#[derive(Default)]
struct ScriptedBackend {
    calls: Vec<&'static str>,
    nodes: u64,
    edges: Vec<(u64, u64, f64)>,
    fail_on: Option<&'static str>,
    corrupt_custom: bool,
}

impl ScriptedBackend {
    fn call(&mut self, name: &'static str) -> Result<()> {
        self.calls.push(name);
        if self.fail_on == Some(name) {
            return Err(KernelError::simulation_step(0.0, format!("scripted failure in {}", name)));
        }
        Ok(())
    }
}

impl SimulationBackend for ScriptedBackend {
    fn configure(&mut self, _config: &KernelConfig) -> Result<()> {
        self.call("configure")
    }

    fn create(&mut self, _model: &str, count: usize, _params: Option<&ParamMap>) -> Result<NodeCollection> {
        self.call("create")?;
        if count == 0 {
            return Err(KernelError::invalid_parameter("n", "0", "> 0"));
        }
        let first = NodeId::new(self.nodes + 1);
        self.nodes += count as u64;
        Ok(NodeCollection::new(first, count))
    }

    fn connect(
        &mut self,
        pre: &NodeCollection,
        post: &NodeCollection,
        _rule: &ConnectionRule,
        syn: &SynapseSpec,
    ) -> Result<()> {
        self.call("connect")?;
        for s in pre.iter() {
            for t in post.iter() {
                self.edges.push((s.raw(), t.raw(), syn.weight));
            }
        }
        Ok(())
    }

    fn simulate(&mut self, _duration: f64) -> Result<()> {
        self.call("simulate")
    }

    fn get_connections(&mut self, _filter: &ConnectionFilter) -> Result<ConnectionSetId> {
        self.call("get_connections")?;
        Ok(ConnectionSetId::new(0, 0))
    }

    fn get(
        &self,
        _set: ConnectionSetId,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> Result<ConnectionAttributes> {
        let mut edges = self.edges.clone();
        edges.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        if self.corrupt_custom && strategy.is_custom() {
            edges.reverse();
        }
        attrs
            .iter()
            .map(|&attr| {
                let column = match attr {
                    Attribute::Source => AttributeColumn::Ids(edges.iter().map(|e| e.0).collect()),
                    Attribute::Target => AttributeColumn::Ids(edges.iter().map(|e| e.1).collect()),
                    Attribute::Weight => AttributeColumn::Floats(edges.iter().map(|e| e.2).collect()),
                    other => return Err(KernelError::unknown_attribute(other.name())),
                };
                Ok((attr, column))
            })
            .collect()
    }
}

fn small_chain(trials: usize) -> OffsetChainScenario {
    OffsetChainScenario {
        units: 60,
        edges: 40,
        offset: 10,
        trials,
        ..Default::default()
    }
}

#[test]
fn offset_chain_fills_both_buckets() {
    let mut backend = ScriptedBackend::default();
    let report = small_chain(6).run(&mut backend).unwrap();

    assert_eq!(report.scenario, "offset_chain");
    assert_eq!(report.edges, 40);
    assert_eq!(report.trials, 6);
    assert!(report.custom_avg_secs.is_finite());
    assert!(report.standard_avg_secs.is_finite());

    let labels: Vec<_> = report.phases.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, ["Configure", "Create", "Connect", "Simulate", "GetConnections", "Conns.get"]);

    assert_eq!(backend.calls.iter().filter(|c| **c == "connect").count(), 40);
    assert_eq!(backend.calls.last(), Some(&"get_connections"));
}

#[test]
fn zero_trials_report_nan_averages() {
    let mut chain = small_chain(0);
    chain.simulate_ms = 0.0;
    let mut backend = ScriptedBackend::default();
    let report = chain.run(&mut backend).unwrap();

    assert!(report.custom_avg_secs.is_nan());
    assert!(report.standard_avg_secs.is_nan());
    let text = report.to_string();
    assert!(text.contains("custom avg:\tNaN"));
    assert!(text.contains("standard avg:\tNaN"));
    assert!(!backend.calls.contains(&"simulate"));
    assert!(report.phase_secs("Simulate").is_none());
}

#[test]
fn odd_trials_fail_before_touching_backend() {
    let mut backend = ScriptedBackend::default();
    let err = small_chain(5).run(&mut backend).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidArgs(_)));
    assert!(backend.calls.is_empty());
}

#[test]
fn backend_errors_propagate_unchanged() {
    let mut backend = ScriptedBackend {
        fail_on: Some("simulate"),
        ..Default::default()
    };
    let err = small_chain(2).run(&mut backend).unwrap_err();
    match err {
        HarnessError::Kernel(KernelError::SimulationStep { reason, .. }) => {
            assert_eq!(reason, "scripted failure in simulate")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!backend.calls.contains(&"get_connections"));
}

#[test]
fn diverging_strategy_aborts_run() {
    let mut backend = ScriptedBackend {
        corrupt_custom: true,
        ..Default::default()
    };
    let err = small_chain(4).run(&mut backend).unwrap_err();
    assert!(matches!(err, HarnessError::Validation { .. }));
}

#[test]
fn offset_beyond_population_is_a_backend_error() {
    let chain = OffsetChainScenario {
        units: 45,
        ..small_chain(2)
    };
    let err = chain.run(&mut ScriptedBackend::default()).unwrap_err();
    assert!(matches!(err, HarnessError::Kernel(KernelError::IndexOutOfRange { index: 45, len: 45 })));
}

#[test]
fn dense_counts_every_pair() {
    let scenario = DenseScenario {
        units: 7,
        ..Default::default()
    };
    let mut backend = ScriptedBackend::default();
    let report = scenario.run(&mut backend).unwrap();

    assert_eq!(report.edges, 49);
    assert_eq!(report.trials, 0);
    assert!(!report.trial_run);
    assert!(!report.to_string().contains("avg"));
    assert!(report.phase_secs("Total").is_some());
    assert!(report.phase_secs("Conns.get").is_some());
    assert_eq!(backend.edges.len(), 49);
}

#[test]
fn empty_population_is_rejected_by_backend() {
    let scenario = DenseScenario {
        units: 0,
        ..Default::default()
    };
    let err = scenario.run(&mut ScriptedBackend::default()).unwrap_err();
    assert!(matches!(err, HarnessError::Kernel(KernelError::InvalidParameter { .. })));
}

#[test]
fn trial_attributes_are_source_target_weight() {
    assert_eq!(TRIAL_ATTRIBUTES, [Attribute::Source, Attribute::Target, Attribute::Weight]);
}
