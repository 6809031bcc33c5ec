//! # Batch
//!
//! $$
//! B(n) = \max\!\left(1,\ \left\lfloor \frac{2^{20}\,M}{8n} \right\rfloor\right)
//! $$
//!
use ndarray::s;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tracing::trace;

use super::adf_z::simulate_with;
use super::trend::RegressorMatrix;
use super::trend::TrendSpec;
use crate::error::Result;
use crate::error::SimulationError;

/// One unit of dispatched work: `replications` statistics for sample size `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTask {
  pub n: usize,
  pub trend: TrendSpec,
  pub replications: usize,
  pub seed: u64,
}

/// Runs the statistic generator in blocks so that at most roughly
/// `max_memory_mib` of random-walk data is alive at once.
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
  max_memory_mib: f64,
}

impl BatchRunner {
  pub fn new(max_memory_mib: f64) -> Result<Self> {
    if !max_memory_mib.is_finite() || max_memory_mib <= 0.0 {
      return Err(SimulationError::config(format!(
        "memory budget must be a positive number of MiB, got {max_memory_mib}"
      )));
    }
    Ok(Self { max_memory_mib })
  }

  pub fn max_memory_mib(&self) -> f64 {
    self.max_memory_mib
  }

  /// Number of replications simulated per call for sample size `n`.
  pub fn block_size(&self, n: usize) -> usize {
    let raw = (1u64 << 20) as f64 * self.max_memory_mib / (8.0 * n as f64);
    (raw.floor() as usize).max(1)
  }

  /// Simulates `total` statistics, `block_size(n)` at a time.
  ///
  /// The values do not depend on the memory budget, only on the state of `rng`.
  pub fn run<R: Rng + ?Sized>(
    &self,
    n: usize,
    trend: TrendSpec,
    total: usize,
    rng: &mut R,
  ) -> Result<Array1<f64>> {
    if n < 2 {
      return Err(SimulationError::config(format!(
        "sample size must be at least 2, got {n}"
      )));
    }
    if total == 0 {
      return Err(SimulationError::config("replication count must be at least 1"));
    }

    let z = RegressorMatrix::build(trend, n - 1)?;
    let block = self.block_size(n);
    let mut out = Array1::<f64>::zeros(total);
    let mut finished = 0;

    while finished < total {
      let count = block.min(total - finished);
      let stats = simulate_with(&z, count, &mut *rng)?;
      out
        .slice_mut(s![finished..finished + count])
        .assign(&stats);
      finished += count;
      trace!(n, %trend, finished, total, "block done");
    }

    Ok(out)
  }

  /// Worker entry point: seeds a fresh generator from `task.seed` and runs it.
  pub fn run_task(&self, task: &SimulationTask) -> Result<Array1<f64>> {
    let mut rng = StdRng::seed_from_u64(task.seed);
    self.run(task.n, task.trend, task.replications, &mut rng)
  }
}
