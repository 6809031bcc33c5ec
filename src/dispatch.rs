//! # Dispatch
//!
//! $$
//! \{\,t \in T\,\} \xrightarrow{\ \text{par}\ } \{\,z_t\,\}
//! $$
//!
//! Local [`Dispatcher`] implementations: one that runs tasks in order on the
//! calling thread and one backed by a dedicated `rayon` pool.
use ndarray::Array1;
use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::error::Result;
use crate::error::SimulationError;
use crate::simulation::batch::SimulationTask;
use crate::traits::Dispatcher;

/// Runs every task sequentially on the caller's thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialDispatcher;

impl Dispatcher for SerialDispatcher {
  fn map_all<F>(&self, tasks: &[SimulationTask], work: F) -> Result<Vec<Array1<f64>>>
  where
    F: Fn(&SimulationTask) -> Result<Array1<f64>> + Send + Sync,
  {
    tasks.iter().map(|task| run_one(task, &work)).collect()
  }
}

/// Runs tasks concurrently on a private thread pool with `num_workers` threads.
pub struct RayonDispatcher {
  pool: ThreadPool,
}

impl RayonDispatcher {
  pub fn new(num_workers: usize) -> Result<Self> {
    if num_workers == 0 {
      return Err(SimulationError::config("number of workers must be at least 1"));
    }
    let pool = ThreadPoolBuilder::new()
      .num_threads(num_workers)
      .thread_name(|i| format!("adf-zsim-worker-{i}"))
      .build()
      .map_err(|e| SimulationError::config(format!("failed to build worker pool: {e}")))?;

    Ok(Self { pool })
  }

  pub fn num_workers(&self) -> usize {
    self.pool.current_num_threads()
  }
}

impl Dispatcher for RayonDispatcher {
  fn map_all<F>(&self, tasks: &[SimulationTask], work: F) -> Result<Vec<Array1<f64>>>
  where
    F: Fn(&SimulationTask) -> Result<Array1<f64>> + Send + Sync,
  {
    self
      .pool
      .install(|| tasks.par_iter().map(|task| run_one(task, &work)).collect())
  }
}

fn run_one<F>(task: &SimulationTask, work: &F) -> Result<Array1<f64>>
where
  F: Fn(&SimulationTask) -> Result<Array1<f64>>,
{
  debug!(n = task.n, trend = %task.trend, seed = task.seed, "task started");
  work(task).map_err(|e| match e {
    SimulationError::WorkerFailure { .. } => e,
    other => SimulationError::WorkerFailure {
      sample_size: task.n,
      source: Box::new(other),
    },
  })
}
