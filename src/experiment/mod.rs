//! # Experiment State Machine
//!
//! Sequences one trial: watch the cloud deform, freeze the view and wait
//! for the observer, then report who called the collapse first.
//!
//! ```text
//!            t > prediction_start            signal / timeout
//!  OBSERVE ─────────────────────────▶ PREDICT ─────────────────▶ DONE
//!     │                                  │                        │
//!     └──────────────┬───────────────────┴────────────────────────┘
//!                    ▼  detector latched death (any state, highest priority)
//!                   DEAD
//! ```
//!
//! Per tick, in this order and never otherwise:
//! 1. advance simulation time, score the monitored snapshot, feed the detector;
//! 2. death overrides everything;
//! 3. OBSERVE opens the PREDICT window once simulation time passes the start;
//! 4. PREDICT closes on the first signal, or on the wall-clock timeout.
//!
//! All mutable per-trial state lives in one [`ExperimentState`] value that
//! [`advance`] consumes and returns, so the transition rules can be driven
//! directly in tests without any scoring.

pub mod config;
pub mod machine;
pub mod outcome;
pub mod signal;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::detect::{HumanResponse, HumanResponseWindow};
use crate::model::Frame;

pub use config::{CloudConfig, ExperimentConfig, MachineSettings};
pub use machine::{advance, ExperimentStateMachine, Observation, TickContext, TickReport};
pub use outcome::{classify, Outcome, ResultRecord};
pub use signal::{signal_slot, SignalReceiver, SignalSender};

/// Experiment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Observe,
    Predict,
    Done,
    Dead,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Observe => "OBSERVE",
            Mode::Predict => "PREDICT",
            Mode::Done => "DONE",
            Mode::Dead => "DEAD",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The transition taken on a tick, if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// OBSERVE → PREDICT; the view is frozen from now on.
    EnterPredict,
    /// PREDICT → DONE on an observer signal.
    Responded,
    /// PREDICT → DONE on the wall-clock deadline.
    TimedOut,
    /// First tick on which death was observed.
    Died,
}

/// Everything the state machine remembers between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentState {
    pub mode: Mode,
    pub window: HumanResponseWindow,
    /// Set when PREDICT closes: a response time or the timeout sentinel.
    pub human: Option<HumanResponse>,
    /// Wall-clock instant the PREDICT window opened.
    pub window_opened_at: Option<Instant>,
    /// View held on screen while in PREDICT.
    pub frozen: Option<Frame>,
    pub death_reported: bool,
}

impl ExperimentState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Observe,
            window: HumanResponseWindow::new(),
            human: None,
            window_opened_at: None,
            frozen: None,
            death_reported: false,
        }
    }
}

impl Default for ExperimentState {
    fn default() -> Self {
        Self::new()
    }
}
