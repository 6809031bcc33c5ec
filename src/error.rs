//! # Errors
//!
//! $$
//! \text{failure} \in \{\text{config}, \text{linalg}, \text{worker}, \text{persistence}, \text{checkpoint}\}
//! $$
//!
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the simulation engine.
///
/// Degenerate replications are not errors: they surface as `NaN` statistics.
#[derive(Debug, Error)]
pub enum SimulationError {
  /// Invalid parameters, detected before any simulation work starts.
  #[error("invalid configuration: {0}")]
  Configuration(String),

  /// The pseudo-inverse of the regressor matrix could not be computed.
  #[error("linear algebra failure: {0}")]
  Linalg(String),

  /// A dispatched sample-size task failed.
  #[error("worker failed for sample size {sample_size}")]
  WorkerFailure {
    sample_size: usize,
    #[source]
    source: Box<SimulationError>,
  },

  /// A checkpoint could not be written or read.
  #[error("checkpoint persistence failed for {path:?}")]
  Persistence {
    path: PathBuf,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A checkpoint was read but does not match what the caller expects.
  #[error("invalid checkpoint: {0}")]
  InvalidCheckpoint(String),
}

impl SimulationError {
  pub(crate) fn config(msg: impl Into<String>) -> Self {
    SimulationError::Configuration(msg.into())
  }

  pub(crate) fn persistence<E>(path: impl Into<PathBuf>, source: E) -> Self
  where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
  {
    SimulationError::Persistence {
      path: path.into(),
      source: source.into(),
    }
  }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
