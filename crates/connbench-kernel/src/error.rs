//! Error types for the simulation kernel

use thiserror::Error;

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur inside the kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Invalid kernel configuration
    #[error("Invalid kernel configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Model name not registered with the kernel
    #[error("Unknown model '{name}'")]
    UnknownModel {
        /// Requested model name
        name: String,
    },

    /// Node id does not exist in the current network
    #[error("Node {node_id} not found (network size {network_size})")]
    NodeNotFound {
        /// Missing node id
        node_id: u64,
        /// Number of nodes currently created
        network_size: usize,
    },

    /// Index into a node collection is out of range
    #[error("Index {index} out of range for collection of {len} nodes")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the collection
        len: usize,
    },

    /// Connection set handle is stale or was never issued
    #[error("Unknown connection set {handle}")]
    UnknownConnectionSet {
        /// Display form of the handle
        handle: String,
    },

    /// Connection attribute name not recognised
    #[error("Unknown connection attribute '{name}'")]
    UnknownAttribute {
        /// Requested attribute name
        name: String,
    },

    /// Network topology error raised by a connection rule
    #[error("Network topology error: {reason}")]
    NetworkTopology {
        /// Reason for topology error
        reason: String,
    },

    /// Simulation step failed
    #[error("Simulation step failed at {time_ms}ms: {reason}")]
    SimulationStep {
        /// Biological time when the step failed
        time_ms: f64,
        /// Reason for failure
        reason: String,
    },

    /// Worker pool could not be built
    #[error("Thread pool error: {reason}")]
    ThreadPool {
        /// Reason reported by the pool builder
        reason: String,
    },
}

impl KernelError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an unknown model error
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    /// Create an unknown attribute error
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute { name: name.into() }
    }

    /// Create a network topology error
    pub fn network_topology(reason: impl Into<String>) -> Self {
        Self::NetworkTopology {
            reason: reason.into(),
        }
    }

    /// Create a simulation step error
    pub fn simulation_step(time_ms: f64, reason: impl Into<String>) -> Self {
        Self::SimulationStep {
            time_ms,
            reason: reason.into(),
        }
    }
}
