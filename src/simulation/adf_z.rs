//! # ADF z-statistic
//!
//! $$
//! z = (n-1)\left(\frac{\sum_t \tilde y_{t-1}\tilde y_t}{\sum_t \tilde y_{t-1}^2}-1\right)
//! $$
//!
use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::ShapeBuilder;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use super::trend::RegressorMatrix;
use super::trend::TrendSpec;
use crate::error::Result;
use crate::error::SimulationError;

/// Leading random-walk steps discarded before the sample starts.
pub const BURN_IN: usize = 50;

/// Simulates `b` independent ADF z-statistics for sample size `n`.
///
/// Each replication consumes its `n + 50` normal draws from `rng` in one run,
/// so splitting `b` into several calls yields the same statistics.
pub fn simulate<R: Rng + ?Sized>(
  n: usize,
  trend: TrendSpec,
  b: usize,
  rng: &mut R,
) -> Result<Array1<f64>> {
  if n < 2 {
    return Err(SimulationError::config(format!(
      "sample size must be at least 2, got {n}"
    )));
  }
  let z = RegressorMatrix::build(trend, n - 1)?;
  simulate_with(&z, b, rng)
}

/// Same as [`simulate`] with a prebuilt regressor matrix for `nobs = n - 1`.
pub fn simulate_with<R: Rng + ?Sized>(
  z: &RegressorMatrix,
  b: usize,
  rng: &mut R,
) -> Result<Array1<f64>> {
  if b == 0 {
    return Err(SimulationError::config("batch width must be at least 1"));
  }
  let n = z.nobs() + 1;

  let y = random_walks(n, b, rng);
  let y = y.slice(s![BURN_IN.., ..]);
  let lhs = z.project(y.slice(s![1.., ..]));
  let rhs = z.project(y.slice(s![..-1, ..]));

  Ok(z_statistics(lhs.view(), rhs.view()))
}

/// Column-major `(n + 50, b)` cumulative sums of standard normals.
fn random_walks<R: Rng + ?Sized>(n: usize, b: usize, rng: &mut R) -> Array2<f64> {
  let rows = n + BURN_IN;
  let mut y = Array2::<f64>::zeros((rows, b).f());
  for mut col in y.columns_mut() {
    col.assign(&Array1::random_using(rows, StandardNormal, &mut *rng));
  }
  y.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
  y
}

/// Per-column `nobs * (gamma - 1)` with `gamma` the no-intercept OLS slope of
/// `lhs` on `rhs`. A column with zero `rhs` energy yields `NaN`.
pub fn z_statistics(lhs: ArrayView2<'_, f64>, rhs: ArrayView2<'_, f64>) -> Array1<f64> {
  assert_eq!(lhs.dim(), rhs.dim(), "lhs/rhs shape mismatch");
  let nobs = lhs.nrows() as f64;

  // Sequential sums per column keep the result independent of memory layout.
  lhs
    .columns()
    .into_iter()
    .zip(rhs.columns())
    .map(|(l, r)| {
      let xpy = r.iter().zip(l.iter()).map(|(x, y)| x * y).sum::<f64>();
      let xpx = r.iter().map(|x| x * x).sum::<f64>();
      if xpx == 0.0 {
        f64::NAN
      } else {
        nobs * (xpy / xpx - 1.0)
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray::concatenate;
  use ndarray::Array2;
  use ndarray::Axis;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::simulate;
  use super::z_statistics;
  use crate::simulation::trend::TrendSpec;

  #[test]
  fn returns_one_statistic_per_replication() {
    let mut rng = StdRng::seed_from_u64(7);
    for trend in TrendSpec::ALL {
      for b in [1, 3, 64] {
        let stats = simulate(25, trend, b, &mut rng).unwrap();
        assert_eq!(stats.len(), b);
        assert!(stats.iter().all(|v| v.is_finite()), "{trend}: {stats}");
      }
    }
  }

  #[test]
  fn same_seed_gives_identical_statistics() {
    let a = simulate(40, TrendSpec::ConstantTrend, 100, &mut StdRng::seed_from_u64(3)).unwrap();
    let b = simulate(40, TrendSpec::ConstantTrend, 100, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn split_calls_match_single_call() {
    let whole = simulate(35, TrendSpec::Constant, 10, &mut StdRng::seed_from_u64(11)).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let first = simulate(35, TrendSpec::Constant, 4, &mut rng).unwrap();
    let second = simulate(35, TrendSpec::Constant, 6, &mut rng).unwrap();
    let joined = concatenate![Axis(0), first, second];

    assert_eq!(whole, joined);
  }

  #[test]
  fn rejects_degenerate_inputs() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(simulate(1, TrendSpec::None, 10, &mut rng).is_err());
    assert!(simulate(10, TrendSpec::None, 0, &mut rng).is_err());
  }

  #[test]
  fn statistic_matches_hand_computation() {
    // rhs = [1, 2, 3], lhs = [2, 3, 5] -> gamma = 23 / 14
    let rhs = array![[1.0], [2.0], [3.0]];
    let lhs = array![[2.0], [3.0], [5.0]];
    let stat = z_statistics(lhs.view(), rhs.view());
    assert_abs_diff_eq!(stat[0], 3.0 * (23.0 / 14.0 - 1.0), epsilon = 1e-12);
  }

  #[test]
  fn zero_lagged_energy_propagates_nan() {
    let rhs = Array2::<f64>::zeros((5, 2));
    let mut lhs = Array2::<f64>::ones((5, 2));
    lhs.column_mut(1).fill(0.0);
    let stat = z_statistics(lhs.view(), rhs.view());
    assert!(stat.iter().all(|v| v.is_nan()));
  }
}
