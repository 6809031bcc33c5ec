//! # Traits
//!
//! $$
//! \text{dispatch}:\ (\text{task}_1,\dots,\text{task}_m)\mapsto(z^{(1)},\dots,z^{(m)})
//! $$
//!
use ndarray::Array1;

use crate::error::Result;
use crate::simulation::batch::SimulationTask;

/// Fans simulation tasks out to workers and joins their results.
///
/// Implementations decide where tasks run (current thread, a thread pool, ...).
/// They must return results in task order and fail as soon as one task fails.
pub trait Dispatcher: Send + Sync {
  fn map_all<F>(&self, tasks: &[SimulationTask], work: F) -> Result<Vec<Array1<f64>>>
  where
    F: Fn(&SimulationTask) -> Result<Array1<f64>> + Send + Sync;

  /// Runs a single task and blocks until it finishes.
  fn submit<F>(&self, task: SimulationTask, work: F) -> Result<Array1<f64>>
  where
    F: Fn(&SimulationTask) -> Result<Array1<f64>> + Send + Sync,
  {
    let mut out = self.map_all(std::slice::from_ref(&task), work)?;
    Ok(out.remove(0))
  }
}
