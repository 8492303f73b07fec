//! Configuration management for connbench

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};
use crate::scenario::{DenseScenario, OffsetChainScenario};

/// Benchmark configuration file; every table and key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Scenario run when no subcommand is given
    pub default_scenario: ScenarioKind,

    /// `[dense]` table
    pub dense: DenseScenario,

    /// `[offset_chain]` table
    pub offset_chain: OffsetChainScenario,
}

/// Selectable scenarios
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// All-to-all population
    Dense,
    /// Pairwise chain with repeated extraction trials
    #[default]
    OffsetChain,
}

impl BenchConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load_from_file(path: &Path) -> HarnessResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|source| HarnessError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Load `explicit` if given (it must exist), otherwise the default path
    pub fn load(explicit: Option<&Path>) -> HarnessResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(HarnessError::config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Ok(path) => Self::load_from_file(&path),
                Err(_) => Ok(Self::default()),
            },
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> HarnessResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HarnessError::config("Could not determine config directory"))?;
        Ok(config_dir.join("connbench").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connbench_kernel::{SynapseModel, Verbosity};

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: BenchConfig = toml::from_str(
            r#"
            default_scenario = "dense"

            [dense]
            units = 20

            [offset_chain.kernel]
            local_num_threads = 3
            verbosity = "M_INFO"

            [offset_chain.synapse]
            synapse_model = "static_synapse"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_scenario, ScenarioKind::Dense);
        assert_eq!(config.dense.units, 20);
        assert_eq!(config.dense.model, "ht_neuron");
        assert_eq!(config.offset_chain.kernel.local_num_threads, 3);
        assert_eq!(config.offset_chain.kernel.verbosity, Verbosity::Info);
        assert_eq!(config.offset_chain.kernel.rng_seed, 12345);
        assert_eq!(config.offset_chain.synapse.synapse_model, SynapseModel::Static);
        assert_eq!(config.offset_chain.synapse.receptor_type, 0);
        assert_eq!(config.offset_chain.edges, 4000);
    }

    #[test]
    fn test_unknown_synapse_model_rejected() {
        let parsed: Result<BenchConfig, _> = toml::from_str(
            r#"
            [dense.synapse]
            synapse_model = "bogus_synapse"
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_round_trips_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = BenchConfig::default();
        config.offset_chain.trials = 8;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(BenchConfig::load(Some(&path)).unwrap(), config);
        assert!(BenchConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[dense\nunits = ").unwrap();

        let err = BenchConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file "));
        match err {
            HarnessError::ConfigParse { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
