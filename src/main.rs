use std::path::PathBuf;

use adf_zsim::config::SimulationConfig;
use adf_zsim::dispatch::RayonDispatcher;
use adf_zsim::experiment::CheckpointStore;
use adf_zsim::experiment::ExperimentDriver;
use adf_zsim::simulation::TrendSpec;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing::Level;

/// Simulate ADF z-test critical values and store them as `adf_z_<trend>.npz`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Directory receiving one checkpoint file per trend
  #[arg(short, long, default_value = ".")]
  output_dir: PathBuf,

  /// Trends to simulate (nc, c, ct, ctt)
  #[arg(short, long, value_delimiter = ',', default_value = "nc,c,ct,ctt")]
  trends: Vec<TrendSpec>,

  /// Number of parallel workers
  #[arg(short = 'j', long, default_value_t = 4)]
  num_workers: usize,

  /// Number of experiment repetitions
  #[arg(long, default_value_t = 500)]
  ex_num: usize,

  /// Simulations per experiment and sample size
  #[arg(long, default_value_t = 200_000)]
  ex_size: usize,

  /// Approximate memory ceiling per worker, in MiB
  #[arg(long, default_value_t = 100.0)]
  max_memory: f64,

  /// Sample sizes, in result order (default: 2000 down to 20)
  #[arg(long, value_delimiter = ',')]
  sample_sizes: Option<Vec<usize>>,

  /// Percentile grid in percent (default: 0.5, 1.0, ..., 99.5)
  #[arg(long, value_delimiter = ',')]
  percentiles: Option<Vec<f64>>,

  /// Experiments between checkpoints
  #[arg(long, default_value_t = 50)]
  checkpoint_every: usize,

  /// Seed of the master generator
  #[arg(short, long, default_value_t = 0)]
  seed: u64,

  /// Continue from existing checkpoints in the output directory
  #[arg(long)]
  resume: bool,

  /// Show a progress bar per trend
  #[arg(long)]
  progress: bool,

  #[arg(long, default_value_t = Level::INFO)]
  log_level: Level,
}

impl Args {
  fn config(&self) -> SimulationConfig {
    let defaults = SimulationConfig::default();
    SimulationConfig {
      num_workers: self.num_workers,
      ex_num: self.ex_num,
      ex_size: self.ex_size,
      max_memory_mib: self.max_memory,
      trends: self.trends.clone(),
      sample_sizes: self.sample_sizes.clone().unwrap_or(defaults.sample_sizes),
      percentiles: self.percentiles.clone().unwrap_or(defaults.percentiles),
      checkpoint_every: self.checkpoint_every,
      master_seed: self.seed,
      show_progress: self.progress,
    }
  }
}

fn main() -> Result<()> {
  let args = Args::parse();
  tracing_subscriber::fmt()
    .with_max_level(args.log_level)
    .with_target(false)
    .init();

  let config = args.config();
  config.validate().context("invalid simulation parameters")?;
  let dispatcher = RayonDispatcher::new(config.num_workers)?;
  let store = CheckpointStore::new(&args.output_dir);

  info!(
    workers = dispatcher.num_workers(),
    ex_num = config.ex_num,
    ex_size = config.ex_size,
    output = %store.dir().display(),
    "starting simulation"
  );

  for &trend in &config.trends {
    let mut driver =
      ExperimentDriver::new(&config, trend, &dispatcher)?.with_store(store.clone());

    if args.resume {
      if let Some(checkpoint) = store
        .load(trend)
        .with_context(|| format!("failed to read checkpoint for trend {trend}"))?
      {
        driver.resume(checkpoint)?;
      }
    }

    driver
      .run()
      .with_context(|| format!("simulation failed for trend {trend}"))?;
    info!(%trend, path = %store.path_for(trend).display(), "trend finished");
  }

  Ok(())
}
