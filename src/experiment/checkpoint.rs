use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use ndarray::Array1;
use ndarray::Array3;
use ndarray::Axis;
use ndarray_npy::NpzReader;
use ndarray_npy::NpzWriter;
use ndarray_npy::ReadNpzError;
use ndarray_npy::WriteNpzError;
use tempfile::NamedTempFile;
use tracing::info;

use super::result::ExperimentResult;
use crate::error::Result;
use crate::error::SimulationError;
use crate::simulation::trend::TrendSpec;

/// Snapshot of one trend's experiment tensor and the grids that index it.
#[derive(Debug, Clone)]
pub struct Checkpoint {
  pub trend: TrendSpec,
  pub results: Array3<f64>,
  pub percentiles: Vec<f64>,
  pub sample_sizes: Vec<usize>,
  /// Leading experiments of `results` that are filled.
  pub completed: usize,
  pub master_seed: u64,
}

impl Checkpoint {
  pub fn from_result(
    trend: TrendSpec,
    result: &ExperimentResult,
    percentiles: &[f64],
    sample_sizes: &[usize],
    master_seed: u64,
  ) -> Self {
    Self {
      trend,
      results: result.view().to_owned(),
      percentiles: percentiles.to_vec(),
      sample_sizes: sample_sizes.to_vec(),
      completed: result.completed(),
      master_seed,
    }
  }

  /// Writes the checkpoint as an `.npz` archive.
  ///
  /// The archive is written to a temporary file next to `path` and renamed
  /// over it, so readers see either the old or the new checkpoint.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| SimulationError::persistence(path, e))?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| SimulationError::persistence(path, e))?;
    let mut npz = NpzWriter::new(tmp);
    self
      .write_arrays(&mut npz)
      .map_err(|e| SimulationError::persistence(path, e))?;
    let tmp = npz
      .finish()
      .map_err(|e| SimulationError::persistence(path, e))?;
    tmp
      .as_file()
      .sync_all()
      .map_err(|e| SimulationError::persistence(path, e))?;
    tmp
      .persist(path)
      .map_err(|e| SimulationError::persistence(path, e.error))?;

    info!(
      path = %path.display(),
      trend = %self.trend,
      completed = self.completed,
      "checkpoint written"
    );
    Ok(())
  }

  fn write_arrays(&self, npz: &mut NpzWriter<NamedTempFile>) -> std::result::Result<(), WriteNpzError> {
    let trend = Array1::from(self.trend.tag().as_bytes().to_vec());
    let percentiles = Array1::from(self.percentiles.clone());
    let sample_sizes: Array1<u64> = self.sample_sizes.iter().map(|&n| n as u64).collect();

    npz.add_array("trend", &trend)?;
    npz.add_array("results", &self.results)?;
    npz.add_array("percentiles", &percentiles)?;
    npz.add_array("sample_sizes", &sample_sizes)?;
    npz.add_array("completed", &Array1::from(vec![self.completed as u64]))?;
    npz.add_array("master_seed", &Array1::from(vec![self.master_seed]))?;
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SimulationError::persistence(path, e))?;
    let mut npz = NpzReader::new(file).map_err(|e| SimulationError::persistence(path, e))?;
    let read_err = |e: ReadNpzError| SimulationError::persistence(path, e);

    let trend: Array1<u8> = npz.by_name("trend").map_err(read_err)?;
    let results: Array3<f64> = npz.by_name("results").map_err(read_err)?;
    let percentiles: Array1<f64> = npz.by_name("percentiles").map_err(read_err)?;
    let sample_sizes: Array1<u64> = npz.by_name("sample_sizes").map_err(read_err)?;
    let completed: Array1<u64> = npz.by_name("completed").map_err(read_err)?;
    let master_seed: Array1<u64> = npz.by_name("master_seed").map_err(read_err)?;

    let trend = std::str::from_utf8(trend.as_slice().unwrap_or_default())
      .map_err(|e| SimulationError::InvalidCheckpoint(format!("trend tag is not UTF-8: {e}")))?
      .parse::<TrendSpec>()
      .map_err(|e| SimulationError::InvalidCheckpoint(e.to_string()))?;
    let scalar = |a: &Array1<u64>, name: &str| {
      a.first().copied().ok_or_else(|| {
        SimulationError::InvalidCheckpoint(format!("'{name}' is empty"))
      })
    };

    let checkpoint = Self {
      trend,
      results,
      percentiles: percentiles.to_vec(),
      sample_sizes: sample_sizes.iter().map(|&n| n as usize).collect(),
      completed: scalar(&completed, "completed")? as usize,
      master_seed: scalar(&master_seed, "master_seed")?,
    };
    checkpoint.check_shape()?;
    Ok(checkpoint)
  }

  fn check_shape(&self) -> Result<()> {
    let (n_p, n_t, ex_num) = self.results.dim();
    if n_p != self.percentiles.len() || n_t != self.sample_sizes.len() {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "results shape {:?} does not match {} percentiles and {} sample sizes",
        self.results.dim(),
        self.percentiles.len(),
        self.sample_sizes.len()
      )));
    }
    if self.completed > ex_num {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "{} completed experiments exceed capacity {ex_num}",
        self.completed
      )));
    }
    Ok(())
  }

  pub fn ex_num(&self) -> usize {
    self.results.len_of(Axis(2))
  }

  pub fn into_result(self) -> Result<ExperimentResult> {
    ExperimentResult::from_parts(self.results, self.completed)
  }
}

/// Directory holding one `adf_z_<trend>.npz` checkpoint per trend.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
  dir: PathBuf,
}

impl CheckpointStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn path_for(&self, trend: TrendSpec) -> PathBuf {
    self.dir.join(format!("adf_z_{}.npz", trend.tag()))
  }

  pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
    checkpoint.save(self.path_for(checkpoint.trend))
  }

  /// Latest checkpoint for `trend`, or `None` if none was written yet.
  pub fn load(&self, trend: TrendSpec) -> Result<Option<Checkpoint>> {
    let path = self.path_for(trend);
    if !path.exists() {
      return Ok(None);
    }
    Checkpoint::load(path).map(Some)
  }
}
