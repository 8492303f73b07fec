//! Error handling for the connbench harness

use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Harness errors
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Backend call failed
    #[error("Kernel error: {0}")]
    Kernel(#[from] connbench_kernel::KernelError),

    /// Extracted attributes did not match the wiring pattern
    #[error("Validation failed ({check}): {detail}")]
    Validation {
        /// Which check failed
        check: &'static str,
        /// What was observed
        detail: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        /// File that failed to parse
        path: PathBuf,
        /// TOML decode failure
        source: toml::de::Error,
    },

    /// Report could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

impl HarnessError {
    /// Create a validation error
    pub fn validation(check: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            check,
            detail: detail.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}
