//! Control loop error types
//!
//! Error types for the host control loop using `thiserror`.

use thinkcontrol_bci_core::ConfigError;
use thiserror::Error;

/// Errors raised by the host control loop.
#[derive(Error, Debug)]
pub enum LoopError {
    /// A configuration value is out of domain
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The tick timer needs a tokio runtime to run on
    #[error("No tokio runtime available to drive the tick timer")]
    NoRuntime,
}

/// Result type for control loop operations
pub type LoopResult<T> = Result<T, LoopError>;
