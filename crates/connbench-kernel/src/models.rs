//! Registry of neuron and synapse models known to the kernel

use crate::{error::*, neuron::LIFParams, plasticity::STDPParams};
use core::fmt;
use core::ops::RangeInclusive;

/// Neuron model preset
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronModel {
    /// Registered name
    pub name: &'static str,
    /// Default dynamics parameters
    pub params: LIFParams,
    /// Valid receptor ports
    pub receptors: RangeInclusive<i64>,
}

/// Synapse model kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum SynapseModel {
    /// Fixed weight
    Static,
    /// Pair-based spike-timing dependent plasticity
    Stdp,
}

impl SynapseModel {
    /// All registered synapse models
    pub const ALL: [SynapseModel; 2] = [SynapseModel::Static, SynapseModel::Stdp];

    /// Registered name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Static => "static_synapse",
            Self::Stdp => "stdp_synapse",
        }
    }

    /// Look up a synapse model by name
    pub fn lookup(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| KernelError::unknown_model(name))
    }

    /// Default plasticity parameters, if the model is plastic
    pub fn plasticity(&self) -> Option<STDPParams> {
        match self {
            Self::Static => None,
            Self::Stdp => Some(STDPParams::default()),
        }
    }
}

impl fmt::Display for SynapseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for SynapseModel {
    type Error = KernelError;

    fn try_from(value: String) -> Result<Self> {
        Self::lookup(&value)
    }
}

impl From<SynapseModel> for String {
    fn from(value: SynapseModel) -> Self {
        value.name().to_string()
    }
}

/// Look up a neuron model preset by name
pub fn neuron_model(name: &str) -> Result<NeuronModel> {
    match name {
        "ht_neuron" => Ok(NeuronModel {
            name: "ht_neuron",
            params: LIFParams {
                tau_m: 16.0,
                v_rest: -70.0,
                v_reset: -70.0,
                v_thresh: -51.0,
                t_refrac: 2.0,
                r_m: 10.0,
                c_m: 1.0,
                i_e: 0.0,
            },
            // AMPA, NMDA, GABA_A, GABA_B
            receptors: 1..=4,
        }),
        "iaf_psc_alpha" => Ok(NeuronModel {
            name: "iaf_psc_alpha",
            params: LIFParams {
                tau_m: 10.0,
                v_rest: -70.0,
                v_reset: -70.0,
                v_thresh: -55.0,
                t_refrac: 2.0,
                r_m: 40.0,
                c_m: 0.25,
                i_e: 0.0,
            },
            receptors: 0..=0,
        }),
        "iaf_psc_exp" => Ok(NeuronModel {
            name: "iaf_psc_exp",
            params: LIFParams::default(),
            receptors: 0..=0,
        }),
        _ => Err(KernelError::unknown_model(name)),
    }
}

/// Names of all registered neuron models
pub const NEURON_MODELS: [&str; 3] = ["ht_neuron", "iaf_psc_alpha", "iaf_psc_exp"];
