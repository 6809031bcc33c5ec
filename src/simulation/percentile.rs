//! # Percentile
//!
//! $$
//! \hat q(p) = x_{(\lfloor h\rfloor)} + (h-\lfloor h\rfloor)\,(x_{(\lfloor h\rfloor+1)}-x_{(\lfloor h\rfloor)}),\quad h=\tfrac{p}{100}(m-1)
//! $$
//!
use ndarray::Array1;
use ndarray::ArrayView1;
use noisy_float::types::n64;
use noisy_float::types::N64;

use crate::error::Result;
use crate::error::SimulationError;

/// Percentiles of `stats` at `grid` (in percent), linearly interpolated
/// between order statistics.
///
/// `NaN` statistics are dropped before ranking. When nothing is left the
/// result is all `NaN`.
pub fn percentiles(stats: ArrayView1<'_, f64>, grid: &[f64]) -> Result<Array1<f64>> {
  if let Some(p) = grid.iter().find(|p| !(0.0..=100.0).contains(*p)) {
    return Err(SimulationError::config(format!(
      "percentile {p} outside [0, 100]"
    )));
  }

  let mut sorted: Vec<N64> = stats
    .iter()
    .filter(|v| !v.is_nan())
    .map(|&v| n64(v))
    .collect();
  if sorted.is_empty() {
    return Ok(Array1::from_elem(grid.len(), f64::NAN));
  }
  sorted.sort_unstable();

  Ok(grid.iter().map(|&p| interpolate(&sorted, p)).collect())
}

/// Linear interpolation at rank `p / 100 * (m - 1)` of a sorted, non-empty
/// slice.
fn interpolate(sorted: &[N64], p: f64) -> f64 {
  let h = p / 100.0 * (sorted.len() - 1) as f64;
  let lo = h.floor() as usize;
  let hi = (lo + 1).min(sorted.len() - 1);
  let frac = h - lo as f64;
  let (a, b) = (sorted[lo].raw(), sorted[hi].raw());

  // Ties and exact ranks skip the arithmetic so infinities survive.
  if frac == 0.0 || a == b {
    return a;
  }
  (1.0 - frac) * a + frac * b
}
