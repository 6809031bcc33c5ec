use chrono::Utc;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use tracing::error;
use tracing::info;

use super::checkpoint::Checkpoint;
use super::checkpoint::CheckpointStore;
use super::result::ExperimentResult;
use super::seeds::SeedSchedule;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::error::SimulationError;
use crate::simulation::batch::BatchRunner;
use crate::simulation::batch::SimulationTask;
use crate::simulation::percentile::percentiles;
use crate::simulation::trend::TrendSpec;
use crate::traits::Dispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
  NotStarted,
  SeedsDrawn,
  /// Experiment `i` is being simulated; experiments `..i` are final.
  Iterating(usize),
  Completed,
}

/// Repeats the simulation `ex_num` times for one trend, reducing every
/// sample size to its percentile vector and checkpointing as it goes.
pub struct ExperimentDriver<'a, D: Dispatcher> {
  config: &'a SimulationConfig,
  trend: TrendSpec,
  dispatcher: &'a D,
  runner: BatchRunner,
  store: Option<CheckpointStore>,
  seeds: Option<SeedSchedule>,
  result: ExperimentResult,
  state: DriverState,
}

impl<'a, D: Dispatcher> ExperimentDriver<'a, D> {
  pub fn new(config: &'a SimulationConfig, trend: TrendSpec, dispatcher: &'a D) -> Result<Self> {
    config.validate()?;
    let runner = BatchRunner::new(config.max_memory_mib)?;
    let result = ExperimentResult::new(
      config.percentiles.len(),
      config.sample_sizes.len(),
      config.ex_num,
    );

    Ok(Self {
      config,
      trend,
      dispatcher,
      runner,
      store: None,
      seeds: None,
      result,
      state: DriverState::NotStarted,
    })
  }

  /// Persist checkpoints into `store`.
  pub fn with_store(mut self, store: CheckpointStore) -> Self {
    self.store = Some(store);
    self
  }

  pub fn trend(&self) -> TrendSpec {
    self.trend
  }

  pub fn state(&self) -> DriverState {
    self.state
  }

  pub fn result(&self) -> &ExperimentResult {
    &self.result
  }

  pub fn into_result(self) -> ExperimentResult {
    self.result
  }

  /// Continues from `checkpoint` instead of starting from an empty tensor.
  ///
  /// The checkpoint must come from the same trend, grids, experiment count
  /// and master seed.
  pub fn resume(&mut self, checkpoint: Checkpoint) -> Result<()> {
    if self.state != DriverState::NotStarted {
      return Err(SimulationError::config("can only resume a driver that has not started"));
    }
    if checkpoint.trend != self.trend {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "checkpoint is for trend {}, driver runs {}",
        checkpoint.trend, self.trend
      )));
    }
    if checkpoint.percentiles != self.config.percentiles {
      return Err(SimulationError::InvalidCheckpoint(
        "percentile grid differs from configuration".into(),
      ));
    }
    if checkpoint.sample_sizes != self.config.sample_sizes {
      return Err(SimulationError::InvalidCheckpoint(
        "sample-size grid differs from configuration".into(),
      ));
    }
    if checkpoint.ex_num() != self.config.ex_num {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "checkpoint holds {} experiments, configuration asks for {}",
        checkpoint.ex_num(),
        self.config.ex_num
      )));
    }
    if checkpoint.master_seed != self.config.master_seed {
      return Err(SimulationError::InvalidCheckpoint(format!(
        "checkpoint master seed {} differs from {}",
        checkpoint.master_seed, self.config.master_seed
      )));
    }

    self.result = checkpoint.into_result()?;
    info!(
      trend = %self.trend,
      completed = self.result.completed(),
      "resuming from checkpoint"
    );
    Ok(())
  }

  fn draw_seeds(&mut self) {
    self.seeds = Some(SeedSchedule::draw(self.config.master_seed, self.config.ex_num));
    self.state = DriverState::SeedsDrawn;
  }

  /// Runs every remaining experiment.
  ///
  /// A failed experiment leaves no trace in the tensor; the error is
  /// returned and the last checkpoint stays as it was.
  pub fn run(&mut self) -> Result<()> {
    if self.state == DriverState::Completed {
      return Ok(());
    }
    if self.seeds.is_none() {
      self.draw_seeds();
    }

    let ex_num = self.config.ex_num;
    let pb = self.progress_bar();

    for i in self.result.completed()..ex_num {
      self.state = DriverState::Iterating(i);
      info!(trend = %self.trend, "experiment {}/{}", i + 1, ex_num);
      let started = Utc::now();

      if let Err(e) = self.run_iteration(i) {
        error!(trend = %self.trend, experiment = i + 1, error = %e, "experiment aborted");
        pb.abandon();
        return Err(e);
      }

      let elapsed = Utc::now() - started;
      info!(
        trend = %self.trend,
        elapsed_ms = elapsed.num_milliseconds(),
        "experiment {} done",
        i + 1
      );
      pb.inc(1);

      let completed = i + 1;
      if completed % self.config.checkpoint_every == 0 || completed == ex_num {
        if let Err(e) = self.checkpoint() {
          error!(trend = %self.trend, completed, error = %e, "checkpoint failed");
          pb.abandon();
          return Err(e);
        }
      }
    }

    pb.finish_and_clear();
    self.state = DriverState::Completed;
    Ok(())
  }

  fn run_iteration(&mut self, i: usize) -> Result<()> {
    let seed = self
      .seeds
      .as_ref()
      .map(|s| s.seed(i))
      .ok_or_else(|| SimulationError::config("seed schedule was not drawn"))?;

    let tasks: Vec<SimulationTask> = self
      .config
      .sample_sizes
      .iter()
      .map(|&n| SimulationTask {
        n,
        trend: self.trend,
        replications: self.config.ex_size,
        seed,
      })
      .collect();

    let runner = self.runner;
    let stats = self
      .dispatcher
      .map_all(&tasks, |task| runner.run_task(task))?;

    let columns = stats
      .iter()
      .map(|z| percentiles(z.view(), &self.config.percentiles))
      .collect::<Result<Vec<_>>>()?;

    self.result.write_iteration(i, &columns)
  }

  /// Writes the current tensor to the store, if one is attached.
  pub fn checkpoint(&self) -> Result<()> {
    let Some(store) = &self.store else {
      return Ok(());
    };
    let checkpoint = Checkpoint::from_result(
      self.trend,
      &self.result,
      &self.config.percentiles,
      &self.config.sample_sizes,
      self.config.master_seed,
    );
    store.save(&checkpoint)
  }

  fn progress_bar(&self) -> ProgressBar {
    if !self.config.show_progress {
      return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(self.config.ex_num as u64);
    if let Ok(style) =
      ProgressStyle::with_template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len} ({eta})")
    {
      pb.set_style(style);
    }
    pb.set_message(format!("trend {}", self.trend));
    pb.set_position(self.result.completed() as u64);
    pb
  }
}
