//! # Trend
//!
//! $$
//! \tilde y = y - Z\,Z^{+}y,\qquad Z=[\mathbf 1,\ \tau,\ \tau^2]_{:,1..k}
//! $$
//!
use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;

use crate::error::Result;
use crate::error::SimulationError;

/// Deterministic terms removed from the series before the statistic is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendSpec {
  /// No deterministic terms (`nc`).
  None,
  /// Constant (`c`).
  Constant,
  /// Constant and linear trend (`ct`).
  ConstantTrend,
  /// Constant, linear and quadratic trend (`ctt`).
  ConstantTrendSquared,
}

impl TrendSpec {
  pub const ALL: [TrendSpec; 4] = [
    TrendSpec::None,
    TrendSpec::Constant,
    TrendSpec::ConstantTrend,
    TrendSpec::ConstantTrendSquared,
  ];

  /// Short tag used in file names and on the command line.
  pub fn tag(self) -> &'static str {
    match self {
      TrendSpec::None => "nc",
      TrendSpec::Constant => "c",
      TrendSpec::ConstantTrend => "ct",
      TrendSpec::ConstantTrendSquared => "ctt",
    }
  }

  /// Number of deterministic regressors.
  pub fn k(self) -> usize {
    match self {
      TrendSpec::None => 0,
      TrendSpec::Constant => 1,
      TrendSpec::ConstantTrend => 2,
      TrendSpec::ConstantTrendSquared => 3,
    }
  }
}

impl fmt::Display for TrendSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl FromStr for TrendSpec {
  type Err = SimulationError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim() {
      "nc" => Ok(TrendSpec::None),
      "c" => Ok(TrendSpec::Constant),
      "ct" => Ok(TrendSpec::ConstantTrend),
      "ctt" => Ok(TrendSpec::ConstantTrendSquared),
      other => Err(SimulationError::config(format!(
        "unknown trend '{other}', expected one of nc, c, ct, ctt"
      ))),
    }
  }
}

/// Deterministic regressor matrix `Z` of shape `(nobs, k)` together with its
/// Moore-Penrose pseudo-inverse.
#[derive(Debug, Clone)]
pub struct RegressorMatrix {
  trend: TrendSpec,
  z: Array2<f64>,
  pinv: Array2<f64>,
}

impl RegressorMatrix {
  pub fn build(trend: TrendSpec, nobs: usize) -> Result<Self> {
    let k = trend.k();
    let z = Array2::from_shape_fn((nobs, k), |(t, j)| ((t + 1) as f64).powi(j as i32));
    let pinv = if k == 0 {
      Array2::zeros((0, nobs))
    } else {
      pseudo_inverse(&z)?
    };

    Ok(Self { trend, z, pinv })
  }

  pub fn trend(&self) -> TrendSpec {
    self.trend
  }

  pub fn z(&self) -> ArrayView2<'_, f64> {
    self.z.view()
  }

  pub fn nobs(&self) -> usize {
    self.z.nrows()
  }

  pub fn ncols(&self) -> usize {
    self.z.ncols()
  }

  /// Residuals of the least-squares projection of every column of `series`
  /// onto the column space of `Z`. With no regressors the input is returned as is.
  pub fn project(&self, series: ArrayView2<'_, f64>) -> Array2<f64> {
    assert_eq!(
      series.nrows(),
      self.nobs(),
      "series length must match the regressor matrix"
    );
    if self.ncols() == 0 {
      return series.to_owned();
    }

    let beta = self.pinv.dot(&series);
    &series - &self.z.dot(&beta)
  }

  pub fn project_series(&self, series: ArrayView1<'_, f64>) -> Array1<f64> {
    self
      .project(series.insert_axis(Axis(1)))
      .index_axis_move(Axis(1), 0)
  }
}

// Singular values below `1e-15 * sigma_max` are treated as zero, as numpy's `pinv` does.
fn pseudo_inverse(z: &Array2<f64>) -> Result<Array2<f64>> {
  let (nobs, k) = z.dim();
  let z_mat = DMatrix::from_fn(nobs, k, |i, j| z[[i, j]]);
  let svd = z_mat.svd(true, true);
  let sigma_max = svd.singular_values.max();
  let pinv = svd
    .pseudo_inverse(sigma_max * 1e-15)
    .map_err(|e| SimulationError::Linalg(e.to_string()))?;

  Ok(Array2::from_shape_fn((k, nobs), |(i, j)| pinv[(i, j)]))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array1;
  use ndarray::Array2;

  use super::RegressorMatrix;
  use super::TrendSpec;

  fn wiggly(nobs: usize, ncols: usize) -> Array2<f64> {
    Array2::from_shape_fn((nobs, ncols), |(t, j)| {
      let t = t as f64;
      3.0 + 0.2 * t + (t * 0.7 + j as f64).sin() * 5.0
    })
  }

  #[test]
  fn no_trend_returns_series_untouched() {
    let z = RegressorMatrix::build(TrendSpec::None, 40).unwrap();
    let y = wiggly(40, 3);
    assert_eq!(z.ncols(), 0);
    assert_eq!(z.project(y.view()), y);
  }

  #[test]
  fn constant_residuals_have_zero_mean() {
    let z = RegressorMatrix::build(TrendSpec::Constant, 57).unwrap();
    let resid = z.project(wiggly(57, 4).view());
    for col in resid.columns() {
      assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-10);
    }
  }

  #[test]
  fn linear_trend_is_removed_exactly() {
    let nobs = 80;
    let z = RegressorMatrix::build(TrendSpec::ConstantTrend, nobs).unwrap();
    let y = Array1::from_shape_fn(nobs, |t| 4.0 - 0.5 * (t + 1) as f64);
    let resid = z.project_series(y.view());
    for r in resid.iter() {
      assert_abs_diff_eq!(*r, 0.0, epsilon = 1e-9);
    }
  }

  #[test]
  fn quadratic_residuals_are_orthogonal_to_regressors() {
    let nobs = 120;
    let z = RegressorMatrix::build(TrendSpec::ConstantTrendSquared, nobs).unwrap();
    assert_eq!(z.z().dim(), (nobs, 3));

    let resid = z.project(wiggly(nobs, 2).view());
    let cross = z.z().t().dot(&resid);
    let scale = (nobs as f64).powi(3);
    for c in cross.iter() {
      assert!(c.abs() / scale < 1e-7, "regressor not orthogonal: {c}");
    }
  }

  #[test]
  fn regressor_columns_are_powers_of_time() {
    let z = RegressorMatrix::build(TrendSpec::ConstantTrendSquared, 29).unwrap();
    assert_eq!(z.nobs(), 29);
    assert_eq!(z.z()[[0, 0]], 1.0);
    assert_eq!(z.z()[[4, 1]], 5.0);
    assert_eq!(z.z()[[4, 2]], 25.0);
  }

  #[test]
  fn tags_round_trip_and_reject_unknown() {
    for trend in TrendSpec::ALL {
      assert_eq!(trend.tag().parse::<TrendSpec>().unwrap(), trend);
    }
    assert!("cttt".parse::<TrendSpec>().is_err());
  }
}
