//! # Death Detection
//!
//! Turns the neighbor-overlap time series into at most one death event,
//! and captures the single human response it is raced against.
//!
//! | Type | Latches | Cleared by |
//! |------|---------|------------|
//! | `DeathDetector` | baseline (first update), death time | never |
//! | `HumanResponseWindow` | first response time | never |
//! | `RateObserver` | first rate-of-change alarm | never |

pub mod human;
pub mod observer;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use human::{HumanResponse, HumanResponseWindow, TimeoutPolicy};
pub use observer::{predict_from_rate, RateObserver, RatePolicy};

/// Relative falling-threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorPolicy {
    /// Death when S < `death_ratio` × baseline.
    pub death_ratio: f64,
}

impl DetectorPolicy {
    pub fn new(death_ratio: f64) -> Result<Self> {
        if !(death_ratio > 0.0 && death_ratio <= 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "death ratio must lie in (0, 1], got {death_ratio}"
            )));
        }
        Ok(Self { death_ratio })
    }
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        Self { death_ratio: 0.8 }
    }
}

/// One-shot falling-threshold detector over the score series.
///
/// The first `update` only records the baseline. Afterwards, the first
/// sample strictly below `death_ratio × baseline` latches death at that
/// sample's time. There is no re-arming: a later recovery above the
/// threshold leaves the detector dead.
#[derive(Debug, Clone, Default)]
pub struct DeathDetector {
    policy: DetectorPolicy,
    baseline: Option<f64>,
    t_death: Option<f64>,
    history: Vec<(f64, f64)>,
}

impl DeathDetector {
    pub fn new(policy: DetectorPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Feed one `(t, S)` sample.
    pub fn update(&mut self, t: f64, score: f64) {
        self.history.push((t, score));

        let Some(baseline) = self.baseline else {
            self.baseline = Some(score);
            return;
        };

        if self.t_death.is_none() && score < self.policy.death_ratio * baseline {
            self.t_death = Some(t);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.t_death.is_some()
    }

    /// Time of the first sample that fell below threshold.
    pub fn t_death(&self) -> Option<f64> {
        self.t_death
    }

    /// Score at the first update. Not assumed to be 1.0.
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// The absolute score below which death latches, once a baseline exists.
    pub fn threshold(&self) -> Option<f64> {
        self.baseline.map(|b| self.policy.death_ratio * b)
    }

    pub fn policy(&self) -> DetectorPolicy {
        self.policy
    }

    /// Every `(t, S)` seen so far. Diagnostics only.
    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }
}
