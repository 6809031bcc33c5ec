//! # Experiment
//!
//! Repeated simulation runs for one trend, accumulated into a
//! `[percentile, sample_size, experiment]` tensor and checkpointed to disk.

pub mod checkpoint;
pub mod driver;
pub mod result;
pub mod seeds;

pub use checkpoint::Checkpoint;
pub use checkpoint::CheckpointStore;
pub use driver::DriverState;
pub use driver::ExperimentDriver;
pub use result::ExperimentResult;
pub use seeds::SeedSchedule;
