//! # Simulation
//!
//! Monte Carlo generation of the ADF z-statistic under a unit-root null.
//!
//! | Module         | Description                                                              |
//! |----------------|--------------------------------------------------------------------------|
//! | [`trend`]      | Deterministic regressors and least-squares detrending.                   |
//! | [`adf_z`]      | Random-walk batches and the per-replication z-statistic.                 |
//! | [`batch`]      | Memory-bounded blocked runs and the dispatched task type.                |
//! | [`percentile`] | Percentile reduction of a statistic vector.                              |

pub mod adf_z;
pub mod batch;
pub mod percentile;
pub mod trend;

pub use adf_z::simulate;
pub use batch::BatchRunner;
pub use batch::SimulationTask;
pub use percentile::percentiles;
pub use trend::RegressorMatrix;
pub use trend::TrendSpec;
