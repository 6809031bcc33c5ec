use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::ArrayView3;
use ndarray::Axis;

use crate::error::Result;
use crate::error::SimulationError;

/// Percentile tensor indexed `[percentile, sample_size, experiment]`.
///
/// Starts as all `NaN` and is filled one experiment at a time, in order.
/// A slab is written whole or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
  values: Array3<f64>,
  completed: usize,
}

impl ExperimentResult {
  pub fn new(n_percentiles: usize, n_sample_sizes: usize, ex_num: usize) -> Self {
    Self {
      values: Array3::from_elem((n_percentiles, n_sample_sizes, ex_num), f64::NAN),
      completed: 0,
    }
  }

  /// Rebuilds a partially filled tensor; experiments `completed..` are reset to `NaN`.
  pub fn from_parts(mut values: Array3<f64>, completed: usize) -> Result<Self> {
    let ex_num = values.len_of(Axis(2));
    if completed > ex_num {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "{completed} completed experiments but room for only {ex_num}"
      )));
    }
    values.slice_mut(s![.., .., completed..]).fill(f64::NAN);
    Ok(Self { values, completed })
  }

  pub fn dim(&self) -> (usize, usize, usize) {
    self.values.dim()
  }

  pub fn ex_num(&self) -> usize {
    self.values.len_of(Axis(2))
  }

  /// Number of experiments written so far.
  pub fn completed(&self) -> usize {
    self.completed
  }

  pub fn is_complete(&self) -> bool {
    self.completed == self.ex_num()
  }

  pub fn view(&self) -> ArrayView3<'_, f64> {
    self.values.view()
  }

  /// `(percentile, sample_size)` slab of experiment `i`.
  pub fn iteration(&self, i: usize) -> ArrayView2<'_, f64> {
    self.values.index_axis(Axis(2), i)
  }

  /// Stores the percentile vectors of experiment `i`, one per sample size.
  ///
  /// `i` must be the next unwritten experiment.
  pub fn write_iteration(&mut self, i: usize, columns: &[Array1<f64>]) -> Result<()> {
    let (n_p, n_t, ex_num) = self.values.dim();
    if i != self.completed || i >= ex_num {
      return Err(SimulationError::config(format!(
        "experiment {i} written out of order (next is {}, capacity {ex_num})",
        self.completed
      )));
    }
    if columns.len() != n_t || columns.iter().any(|c| c.len() != n_p) {
      return Err(SimulationError::config(format!(
        "experiment {i} needs {n_t} percentile vectors of length {n_p}"
      )));
    }

    let mut slab = Array2::<f64>::zeros((n_p, n_t));
    for (mut dst, src) in slab.columns_mut().into_iter().zip(columns) {
      dst.assign(src);
    }
    self.values.index_axis_mut(Axis(2), i).assign(&slab);
    self.completed += 1;
    Ok(())
  }

  pub fn into_inner(self) -> Array3<f64> {
    self.values
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use ndarray::Array1;
  use ndarray::Array3;

  use super::ExperimentResult;

  #[test]
  fn starts_missing() {
    let res = ExperimentResult::new(3, 2, 4);
    assert_eq!(res.dim(), (3, 2, 4));
    assert_eq!(res.completed(), 0);
    assert!(res.view().iter().all(|v| v.is_nan()));
  }

  #[test]
  fn writes_whole_slabs_in_order() {
    let mut res = ExperimentResult::new(2, 2, 3);
    res
      .write_iteration(0, &[array![1.0, 2.0], array![3.0, 4.0]])
      .unwrap();
    assert_eq!(res.iteration(0), array![[1.0, 3.0], [2.0, 4.0]]);
    assert!(res.iteration(1).iter().all(|v| v.is_nan()));

    assert!(res
      .write_iteration(2, &[array![0.0, 0.0], array![0.0, 0.0]])
      .is_err());
    assert!(res.iteration(2).iter().all(|v| v.is_nan()));
  }

  #[test]
  fn malformed_slab_leaves_tensor_untouched() {
    let mut res = ExperimentResult::new(2, 2, 2);
    let before = res.clone();
    assert!(res.write_iteration(0, &[array![1.0, 2.0]]).is_err());
    assert!(res
      .write_iteration(0, &[array![1.0, 2.0], Array1::zeros(3)])
      .is_err());
    assert_eq!(res.completed(), before.completed());
    assert!(res.view().iter().all(|v| v.is_nan()));
  }

  #[test]
  fn from_parts_clears_unfinished_experiments() {
    let res = ExperimentResult::from_parts(Array3::from_elem((1, 1, 3), 7.0), 1).unwrap();
    assert_eq!(res.iteration(0)[[0, 0]], 7.0);
    assert!(res.iteration(1)[[0, 0]].is_nan());
    assert!(ExperimentResult::from_parts(Array3::zeros((1, 1, 2)), 3).is_err());
  }

  #[test]
  fn becomes_complete_after_last_slab() {
    let mut res = ExperimentResult::new(1, 1, 2);
    res.write_iteration(0, &[array![1.0]]).unwrap();
    assert!(!res.is_complete());
    res.write_iteration(1, &[array![2.0]]).unwrap();
    assert!(res.is_complete());
  }
}
