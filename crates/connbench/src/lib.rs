//! connbench harness crate
//!
//! Times a create / connect / simulate / query workload against a
//! [`SimulationBackend`] and checks the returned connection attributes.
//!
//! - [`backend`]: the call surface, implemented for [`connbench_kernel::Kernel`].
//! - [`harness`]: wraps a backend and records wall-clock time around each call.
//! - [`scenario`]: the dense and offset-chain workloads.
//! - [`validate`], [`report`], [`timing`]: checks, summaries and raw timings.
//! - [`commands`], [`config`]: the CLI surface and its TOML configuration.
//!
//! The binary (src/main.rs) installs logging and calls `ConnbenchCli::execute()`.

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod scenario;
pub mod timing;
pub mod validate;

pub use backend::SimulationBackend;
pub use commands::ConnbenchCli;
pub use config::BenchConfig;
pub use error::{HarnessError, HarnessResult};
pub use harness::Harness;
pub use report::RunReport;
pub use scenario::{DenseScenario, OffsetChainScenario};
pub use timing::{mean_secs, TimingRecord, TrialBuckets};

/// Diagnostic environment variable logged at startup
pub const MODULE_PATH_ENV: &str = "CONNBENCH_MODULE_PATH";
