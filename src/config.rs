//! # Config
//!
//! $$
//! \mathcal C = (W,\ E,\ R,\ M,\ \mathcal T,\ T,\ P,\ c,\ s_0)
//! $$
//!
use std::collections::HashSet;

use crate::error::Result;
use crate::error::SimulationError;
use crate::simulation::trend::TrendSpec;

/// Sample sizes tabulated by default, largest first.
pub const DEFAULT_SAMPLE_SIZES: [usize; 31] = [
  2000, 1400, 1200, 1000, 900, 800, 700, 600, 500, 450, 400, 350, 300, 250, 200, 180, 160, 140,
  120, 100, 90, 80, 70, 60, 50, 45, 40, 35, 30, 25, 20,
];

/// Parameters of a full critical-value simulation.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
  /// Parallel workers used for the sample-size fan-out.
  pub num_workers: usize,
  /// Number of experiment repetitions (`EX_NUM`).
  pub ex_num: usize,
  /// Replications per experiment and sample size (`EX_SIZE`).
  pub ex_size: usize,
  /// Approximate memory ceiling per worker, in MiB.
  pub max_memory_mib: f64,
  pub trends: Vec<TrendSpec>,
  /// Sample sizes, in the order used to index results.
  pub sample_sizes: Vec<usize>,
  /// Percentile grid in percent, strictly increasing.
  pub percentiles: Vec<f64>,
  /// Completed experiments between checkpoints.
  pub checkpoint_every: usize,
  /// Seed of the master generator that draws the per-experiment seeds.
  pub master_seed: u64,
  pub show_progress: bool,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      num_workers: 4,
      ex_num: 500,
      ex_size: 200_000,
      max_memory_mib: 100.0,
      trends: TrendSpec::ALL.to_vec(),
      sample_sizes: DEFAULT_SAMPLE_SIZES.to_vec(),
      percentiles: default_percentiles(),
      checkpoint_every: 50,
      master_seed: 0,
      show_progress: false,
    }
  }
}

/// `0.5, 1.0, ..., 99.5`.
pub fn default_percentiles() -> Vec<f64> {
  (1..200).map(|i| i as f64 * 0.5).collect()
}

impl SimulationConfig {
  pub fn validate(&self) -> Result<()> {
    if self.num_workers == 0 {
      return Err(SimulationError::config("num_workers must be > 0"));
    }
    if self.ex_num == 0 {
      return Err(SimulationError::config("ex_num must be > 0"));
    }
    if self.ex_size == 0 {
      return Err(SimulationError::config("ex_size must be > 0"));
    }
    if self.checkpoint_every == 0 {
      return Err(SimulationError::config("checkpoint_every must be > 0"));
    }
    if !self.max_memory_mib.is_finite() || self.max_memory_mib <= 0.0 {
      return Err(SimulationError::config(format!(
        "max_memory_mib must be positive, got {}",
        self.max_memory_mib
      )));
    }
    if self.trends.is_empty() {
      return Err(SimulationError::config("at least one trend is required"));
    }

    if self.sample_sizes.is_empty() {
      return Err(SimulationError::config("sample size grid is empty"));
    }
    if let Some(n) = self.sample_sizes.iter().find(|&&n| n < 2) {
      return Err(SimulationError::config(format!(
        "sample sizes must be at least 2, got {n}"
      )));
    }
    let mut seen = HashSet::new();
    if let Some(n) = self.sample_sizes.iter().find(|&&n| !seen.insert(n)) {
      return Err(SimulationError::config(format!("duplicate sample size {n}")));
    }

    if self.percentiles.is_empty() {
      return Err(SimulationError::config("percentile grid is empty"));
    }
    if let Some(p) = self
      .percentiles
      .iter()
      .find(|p| !(0.0..=100.0).contains(*p))
    {
      return Err(SimulationError::config(format!(
        "percentile {p} outside [0, 100]"
      )));
    }
    if self.percentiles.windows(2).any(|w| w[0] >= w[1]) {
      return Err(SimulationError::config(
        "percentile grid must be strictly increasing",
      ));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::default_percentiles;
  use super::SimulationConfig;

  #[test]
  fn defaults_are_valid() {
    let cfg = SimulationConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.sample_sizes.len(), 31);
    assert_eq!(cfg.sample_sizes[0], 2000);
    assert_eq!(default_percentiles().len(), 199);
    assert_eq!(default_percentiles()[198], 99.5);
  }

  #[test]
  fn rejects_bad_grids() {
    let bad = [
      SimulationConfig {
        sample_sizes: vec![30, 1],
        ..SimulationConfig::default()
      },
      SimulationConfig {
        sample_sizes: vec![30, 20, 30],
        ..SimulationConfig::default()
      },
      SimulationConfig {
        percentiles: vec![5.0, 5.0],
        ..SimulationConfig::default()
      },
      SimulationConfig {
        percentiles: vec![50.0, 100.5],
        ..SimulationConfig::default()
      },
      SimulationConfig {
        max_memory_mib: 0.0,
        ..SimulationConfig::default()
      },
      SimulationConfig {
        checkpoint_every: 0,
        ..SimulationConfig::default()
      },
      SimulationConfig {
        trends: vec![],
        ..SimulationConfig::default()
      },
    ];
    for cfg in bad {
      assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }
  }
}
