//! Kernel-wide configuration

use crate::error::*;
use core::fmt;
use core::str::FromStr;

/// Message threshold for kernel diagnostics.
///
/// Levels are ordered from most to least chatty; a message is emitted when its
/// level is at or above the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Verbosity {
    /// Everything, including per-phase chatter
    All,
    /// Informational messages
    Info,
    /// Deprecation notices
    Deprecated,
    /// Warnings
    #[default]
    Warning,
    /// Errors
    Error,
    /// Fatal errors only
    Fatal,
    /// Nothing
    Quiet,
}

impl Verbosity {
    /// Canonical `M_*` name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::All => "M_ALL",
            Self::Info => "M_INFO",
            Self::Deprecated => "M_DEPRECATED",
            Self::Warning => "M_WARNING",
            Self::Error => "M_ERROR",
            Self::Fatal => "M_FATAL",
            Self::Quiet => "M_QUIET",
        }
    }

    /// `log` level used when a message of this verbosity is emitted
    pub(crate) fn log_level(&self) -> log::Level {
        match self {
            Self::All => log::Level::Debug,
            Self::Info | Self::Deprecated => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error | Self::Fatal | Self::Quiet => log::Level::Error,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Verbosity {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_prefix("m_").unwrap_or(&key);
        match key {
            "all" => Ok(Self::All),
            "info" => Ok(Self::Info),
            "deprecated" => Ok(Self::Deprecated),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(KernelError::invalid_parameter(
                "verbosity",
                s,
                "one of M_ALL, M_INFO, M_DEPRECATED, M_WARNING, M_ERROR, M_FATAL, M_QUIET",
            )),
        }
    }
}

impl TryFrom<String> for Verbosity {
    type Error = KernelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Verbosity> for String {
    fn from(value: Verbosity) -> Self {
        value.name().to_string()
    }
}

/// Kernel configuration record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelConfig {
    /// Worker threads used for connection creation, queries and updates
    pub local_num_threads: usize,
    /// Simulation time step (ms)
    pub resolution: f64,
    /// Seed for the kernel RNG
    pub rng_seed: u64,
    /// Diagnostic threshold
    pub verbosity: Verbosity,
    /// Log simulation progress while `simulate` runs
    pub print_time: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            local_num_threads: 1,
            resolution: crate::DEFAULT_RESOLUTION_MS,
            rng_seed: 12345,
            verbosity: Verbosity::Warning,
            print_time: false,
        }
    }
}

impl KernelConfig {
    /// Set the thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.local_num_threads = threads;
        self
    }

    /// Set the resolution (ms)
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Set the verbosity threshold
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Enable or disable progress logging
    pub fn with_print_time(mut self, enabled: bool) -> Self {
        self.print_time = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.local_num_threads == 0 {
            return Err(KernelError::invalid_parameter(
                "local_num_threads",
                "0",
                "> 0",
            ));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(KernelError::invalid_parameter(
                "resolution",
                self.resolution.to_string(),
                "finite and > 0.0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KernelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.local_num_threads, 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(KernelConfig::default().with_threads(0).validate().is_err());
        assert!(KernelConfig::default().with_resolution(0.0).validate().is_err());
        assert!(KernelConfig::default().with_resolution(f64::NAN).validate().is_err());
        assert!(KernelConfig::default().with_threads(8).with_resolution(0.01).validate().is_ok());
    }

    #[test]
    fn test_verbosity_parsing() {
        assert_eq!("M_ALL".parse::<Verbosity>().unwrap(), Verbosity::All);
        assert_eq!("warning".parse::<Verbosity>().unwrap(), Verbosity::Warning);
        assert_eq!("m_quiet".parse::<Verbosity>().unwrap(), Verbosity::Quiet);
        assert!("M_LOUD".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::All < Verbosity::Info);
        assert!(Verbosity::Warning < Verbosity::Error);
        assert_eq!(Verbosity::Deprecated.to_string(), "M_DEPRECATED");
    }
}
