//! # adf-zsim
//!
//! Monte Carlo tabulation of critical values for the augmented Dickey-Fuller
//! z-test, $z = (n-1)(\hat\gamma - 1)$, under the trend specifications
//! `nc`, `c`, `ct` and `ctt`.
//!
//! ## Modules
//!
//! | Module         | Description                                                                 |
//! |----------------|-----------------------------------------------------------------------------|
//! | [`simulation`] | Detrending, statistic generation, memory-bounded batches, percentiles.      |
//! | [`experiment`] | Experiment driver, result tensor, seed schedule and checkpoints.            |
//! | [`dispatch`]   | Serial and `rayon` implementations of [`traits::Dispatcher`].               |
//! | [`config`]     | Simulation parameters and their validation.                                 |
//! | [`error`]      | Error type shared by the crate.                                             |
//!
//! ## Example Usage
//!
//! ```rust
//! use adf_zsim::simulation::BatchRunner;
//! use adf_zsim::simulation::TrendSpec;
//! use rand::SeedableRng;
//!
//! let runner = BatchRunner::new(100.0)?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let z = runner.run(100, TrendSpec::Constant, 10_000, &mut rng)?;
//! assert_eq!(z.len(), 10_000);
//! # Ok::<(), adf_zsim::SimulationError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod experiment;
pub mod simulation;
pub mod traits;

pub use error::Result;
pub use error::SimulationError;
