//! # topodeath — Can a human see topological death coming?
//!
//! A high-dimensional point cloud is deformed over time and projected to
//! 2D for an observer. A detector watches how much of each point's
//! original k-neighborhood survives; when that overlap collapses below a
//! fraction of its starting value, the cloud is "topologically dead".
//! The observer tries to call it first.
//!
//! ## Design Principles
//!
//! 1. **Reference is frozen**: the k-NN graph of the original cloud is built once and only borrowed
//! 2. **Metrics are pure**: `score` and `stress` are functions of `(snapshot, reference)`
//! 3. **Latches never reset**: baseline, death time and the human response are first-write-wins
//! 4. **Death has priority**: a death event overrides an open prediction window on the same tick
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topodeath::experiment::{signal_slot, ExperimentConfig};
//! use topodeath::runner::{Experiment, NullSink};
//!
//! # fn example() -> topodeath::Result<()> {
//! let experiment = Experiment::from_config(ExperimentConfig::default())?;
//! let (observer, signals) = signal_slot();
//! // hand `observer` to whatever captures the human's keypress
//! # drop(observer);
//! let record = experiment.run(&mut NullSink, signals, None)?;
//! println!("{} (delta_t = {:?})", record.outcome, record.delta_t);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Role |
//! |--------|------|
//! | `topology` | Reference k-NN graph, overlap score, edge stress |
//! | `detect` | Death detector, human response window, observer heuristic |
//! | `experiment` | OBSERVE → PREDICT → DONE/DEAD state machine and finalization |
//! | `pipeline` | Ring generator, transforms, fixed projection |
//! | `runner` | Headless tick driver |
//! | `export` | CSV results log |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod topology;
pub mod detect;
pub mod experiment;
pub mod pipeline;
pub mod runner;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Edge, Frame, PointCloud, ScoreSample, Snapshot};

// ============================================================================
// Re-exports: Core
// ============================================================================

pub use topology::{ReferenceTopology, TopologyMetric};
pub use detect::{DeathDetector, DetectorPolicy, HumanResponse, HumanResponseWindow};
pub use experiment::{
    ExperimentState, ExperimentStateMachine, Mode, Outcome, ResultRecord, TickReport, Transition,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Point count mismatch: reference has {expected} points, snapshot has {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Malformed results log: {0}")]
    MalformedResults(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
