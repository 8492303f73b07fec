//! Leaky integrate-and-fire dynamics shared by all neuron model presets

use crate::error::*;
use std::collections::BTreeMap;

/// Per-unit parameter record passed to population creation
pub type ParamMap = BTreeMap<String, f64>;

/// Parameters for Leaky Integrate-and-Fire neurons
#[derive(Debug, Clone, PartialEq)]
pub struct LIFParams {
    /// Membrane time constant (ms)
    pub tau_m: f64,
    /// Resting potential (mV)
    pub v_rest: f64,
    /// Reset potential (mV)
    pub v_reset: f64,
    /// Threshold potential (mV)
    pub v_thresh: f64,
    /// Refractory period (ms)
    pub t_refrac: f64,
    /// Membrane resistance (MΩ)
    pub r_m: f64,
    /// Capacitance (nF)
    pub c_m: f64,
    /// Constant bias current (nA)
    pub i_e: f64,
}

impl Default for LIFParams {
    fn default() -> Self {
        Self {
            tau_m: 20.0,
            v_rest: -70.0,
            v_reset: -70.0,
            v_thresh: -50.0,
            t_refrac: 2.0,
            r_m: 10.0,
            c_m: 1.0,
            i_e: 0.0,
        }
    }
}

impl LIFParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.named() {
            if !value.is_finite() {
                return Err(KernelError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }
        if self.tau_m <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "tau_m",
                self.tau_m.to_string(),
                "> 0.0",
            ));
        }
        if self.v_thresh <= self.v_rest {
            return Err(KernelError::invalid_parameter(
                "v_thresh",
                format!("{} (with v_rest={})", self.v_thresh, self.v_rest),
                "> v_rest",
            ));
        }
        if self.t_refrac < 0.0 {
            return Err(KernelError::invalid_parameter(
                "t_refrac",
                self.t_refrac.to_string(),
                ">= 0.0",
            ));
        }
        if self.r_m <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "r_m",
                self.r_m.to_string(),
                "> 0.0",
            ));
        }
        if self.c_m <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "c_m",
                self.c_m.to_string(),
                "> 0.0",
            ));
        }
        Ok(())
    }

    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("tau_m", self.tau_m),
            ("v_rest", self.v_rest),
            ("v_reset", self.v_reset),
            ("v_thresh", self.v_thresh),
            ("t_refrac", self.t_refrac),
            ("r_m", self.r_m),
            ("c_m", self.c_m),
            ("i_e", self.i_e),
        ]
    }

    /// Return a copy with `overrides` applied by name, validated
    pub fn with_overrides(&self, overrides: &ParamMap) -> Result<Self> {
        let mut params = self.clone();
        for (name, &value) in overrides {
            let slot = match name.as_str() {
                "tau_m" => &mut params.tau_m,
                "v_rest" => &mut params.v_rest,
                "v_reset" => &mut params.v_reset,
                "v_thresh" => &mut params.v_thresh,
                "t_refrac" => &mut params.t_refrac,
                "r_m" => &mut params.r_m,
                "c_m" => &mut params.c_m,
                "i_e" => &mut params.i_e,
                _ => {
                    return Err(KernelError::invalid_parameter(
                        name.clone(),
                        value.to_string(),
                        "a known neuron parameter",
                    ))
                }
            };
            *slot = value;
        }
        params.validate()?;
        Ok(params)
    }
}

/// Runtime state of a neuron
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronState {
    /// Membrane potential (mV)
    pub v_m: f64,
    /// Step index of the last spike
    pub last_spike_step: Option<u64>,
    /// Input current accumulator (nA)
    pub i_input: f64,
}

impl NeuronState {
    /// Create a new neuron state at rest
    pub fn new(v_rest: f64) -> Self {
        Self {
            v_m: v_rest,
            last_spike_step: None,
            i_input: 0.0,
        }
    }

    /// Check if neuron is in refractory period
    pub fn is_refractory(&self, step: u64, refractory_steps: u64) -> bool {
        match self.last_spike_step {
            Some(last) => step.saturating_sub(last) < refractory_steps,
            None => false,
        }
    }

    /// Reset neuron after spike
    pub fn reset(&mut self, v_reset: f64, step: u64) {
        self.v_m = v_reset;
        self.last_spike_step = Some(step);
        self.i_input = 0.0;
    }
}

/// Leaky Integrate-and-Fire neuron
#[derive(Debug, Clone)]
pub struct LIFNeuron {
    /// Neuron parameters
    pub params: LIFParams,
    /// Current state
    pub state: NeuronState,
}

impl LIFNeuron {
    /// Create a new LIF neuron
    pub fn new(params: LIFParams) -> Result<Self> {
        params.validate()?;
        let state = NeuronState::new(params.v_rest);
        Ok(Self { params, state })
    }

    /// Advance one step of `dt_ms`; returns true when the neuron fired
    pub fn update(&mut self, dt_ms: f64, step: u64) -> bool {
        let refractory_steps = (self.params.t_refrac / dt_ms).round() as u64;
        if self.state.is_refractory(step, refractory_steps) {
            self.state.i_input = 0.0;
            return false;
        }

        // dV/dt = (v_rest - v_m + R*(I_syn + I_e)) / tau_m
        let drive = self.params.r_m * (self.state.i_input + self.params.i_e);
        let dv_dt = (self.params.v_rest - self.state.v_m + drive) / self.params.tau_m;
        self.state.v_m += dv_dt * dt_ms;

        if self.state.v_m >= self.params.v_thresh {
            self.state.reset(self.params.v_reset, step);
            true
        } else {
            self.state.i_input = 0.0;
            false
        }
    }

    /// Add synaptic input current
    pub fn receive_input(&mut self, current: f64) {
        self.state.i_input += current;
    }

    /// Current membrane potential
    pub fn membrane_potential(&self) -> f64 {
        self.state.v_m
    }
}
