//! In-process spiking network kernel
//!
//! This crate provides the simulation backend driven by the connbench harness:
//! a session object that creates neuron populations, wires them with
//! connection rules, advances their dynamics, and answers connection queries.
//! Connection storage and queries run on a per-kernel worker pool sized by
//! the configured thread count; results never depend on that count.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod connection;
pub mod error;
pub mod ids;
pub mod kernel;
pub mod models;
pub mod neuron;
pub mod nodes;
pub mod plasticity;
pub mod query;
pub mod simulation;
pub mod store;

// Re-export essential types
pub use config::{KernelConfig, Verbosity};
pub use connection::{Connection, ConnectionRule, SynapseSpec};
pub use error::{KernelError, Result};
pub use ids::{ConnectionSetId, NodeId};
pub use kernel::{Kernel, KernelStatus};
pub use models::SynapseModel;
pub use neuron::{LIFParams, ParamMap};
pub use nodes::NodeCollection;
pub use plasticity::{PlasticityRule, STDPParams, STDPRule};
pub use query::{
    Attribute, AttributeColumn, ConnectionAttributes, ConnectionFilter, ExtractionStrategy,
};
pub use simulation::SimulationReport;

/// Kernel crate version reported by the harness
pub const KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation time step (ms)
pub const DEFAULT_RESOLUTION_MS: f64 = 0.1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let config = KernelConfig::default();
        assert_eq!(config.resolution, DEFAULT_RESOLUTION_MS);

        let stdp_params = STDPParams::default();
        assert!(stdp_params.a_plus > 0.0);

        let kernel = Kernel::new(config).unwrap();
        assert_eq!(kernel.status().network_size, 0);
    }
}
