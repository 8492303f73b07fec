//! Spike-timing dependent plasticity for `stdp_synapse` connections

use crate::error::*;

/// Parameters for the pair-based STDP rule
#[derive(Debug, Clone, PartialEq)]
pub struct STDPParams {
    /// Learning rate for potentiation (weight increase)
    pub a_plus: f64,
    /// Learning rate for depression (weight decrease)
    pub a_minus: f64,
    /// Time constant of the presynaptic trace (ms)
    pub tau_plus: f64,
    /// Time constant of the postsynaptic trace (ms)
    pub tau_minus: f64,
    /// Maximum weight value
    pub w_max: f64,
    /// Minimum weight value
    pub w_min: f64,
}

impl Default for STDPParams {
    fn default() -> Self {
        Self {
            a_plus: 0.01,
            a_minus: 0.012,
            tau_plus: 20.0,
            tau_minus: 20.0,
            w_max: 100.0,
            w_min: 0.0,
        }
    }
}

impl STDPParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.a_plus <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "a_plus",
                self.a_plus.to_string(),
                "> 0.0",
            ));
        }
        if self.a_minus <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "a_minus",
                self.a_minus.to_string(),
                "> 0.0",
            ));
        }
        if self.tau_plus <= 0.0 || self.tau_minus <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "tau_plus/tau_minus",
                format!("{}/{}", self.tau_plus, self.tau_minus),
                "> 0.0",
            ));
        }
        if self.w_max <= self.w_min {
            return Err(KernelError::invalid_parameter(
                "w_max",
                format!("{} (with w_min={})", self.w_max, self.w_min),
                "> w_min",
            ));
        }
        Ok(())
    }

    fn clamp(&self, weight: f64) -> f64 {
        weight.max(self.w_min).min(self.w_max)
    }
}

/// Trait for plasticity rules driven by per-neuron spike traces
pub trait PlasticityRule {
    /// New weight after a presynaptic spike, given the target's trace
    fn on_pre_spike(&self, weight: f64, post_trace: f64) -> f64;

    /// New weight after a postsynaptic spike, given the source's trace
    fn on_post_spike(&self, weight: f64, pre_trace: f64) -> f64;

    /// Per-step decay factors for (pre, post) traces
    fn trace_decay(&self, dt_ms: f64) -> (f64, f64);
}

/// STDP rule implementation
#[derive(Debug, Clone)]
pub struct STDPRule {
    /// STDP parameters
    pub params: STDPParams,
}

impl STDPRule {
    /// Create a new STDP rule
    pub fn new(params: STDPParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl PlasticityRule for STDPRule {
    fn on_pre_spike(&self, weight: f64, post_trace: f64) -> f64 {
        // post before pre: depression
        if post_trace <= 0.0 {
            return weight;
        }
        self.params.clamp(weight - self.params.a_minus * post_trace)
    }

    fn on_post_spike(&self, weight: f64, pre_trace: f64) -> f64 {
        // pre before post: potentiation
        if pre_trace <= 0.0 {
            return weight;
        }
        self.params.clamp(weight + self.params.a_plus * pre_trace)
    }

    fn trace_decay(&self, dt_ms: f64) -> (f64, f64) {
        (
            (-dt_ms / self.params.tau_plus).exp(),
            (-dt_ms / self.params.tau_minus).exp(),
        )
    }
}
