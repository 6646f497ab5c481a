//! Rate-of-change observer heuristic.
//!
//! A stand-in for a human who notices collapse through how fast the
//! structure changes rather than through its absolute level: fire at the
//! first sample whose score moved by more than `sensitivity` compared to
//! the sample `reaction_delay` ticks earlier.
//!
//! Both constants are unvalidated heuristics and stay configurable.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePolicy {
    pub sensitivity: f64,
    /// Lag, in samples, between the two scores being compared. Zero disables
    /// the alarm.
    pub reaction_delay: usize,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self { sensitivity: 0.02, reaction_delay: 3 }
    }
}

impl RatePolicy {
    pub fn new(sensitivity: f64, reaction_delay: usize) -> Result<Self> {
        let policy = Self { sensitivity, reaction_delay };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sensitivity.is_finite() && self.sensitivity >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "observer sensitivity must be finite and non-negative, got {}",
                self.sensitivity
            )));
        }
        Ok(())
    }
}

/// Batch form: time of the first alarm over a recorded series, if any.
pub fn predict_from_rate(times: &[f64], scores: &[f64], policy: &RatePolicy) -> Option<f64> {
    let lag = policy.reaction_delay;
    (lag..times.len().min(scores.len()))
        .find(|&i| (scores[i] - scores[i - lag]).abs() > policy.sensitivity)
        .map(|i| times[i])
}

/// Incremental form of [`predict_from_rate`]: one sample per tick, fires once.
#[derive(Debug, Clone)]
pub struct RateObserver {
    policy: RatePolicy,
    window: VecDeque<f64>,
    fired_at: Option<f64>,
}

impl RateObserver {
    pub fn new(policy: RatePolicy) -> Self {
        Self { policy, window: VecDeque::new(), fired_at: None }
    }

    /// Feed `(t, S)`. Returns `true` only on the tick the alarm first fires.
    pub fn observe(&mut self, t: f64, score: f64) -> bool {
        let lag = self.policy.reaction_delay;
        if self.fired_at.is_some() || lag == 0 {
            return false;
        }
        // holds the last `lag` scores; the front is the lagged one
        if self.window.len() == lag {
            if let Some(lagged) = self.window.pop_front() {
                if (score - lagged).abs() > self.policy.sensitivity {
                    self.fired_at = Some(t);
                    return true;
                }
            }
        }
        self.window.push_back(score);
        false
    }

    pub fn fired_at(&self) -> Option<f64> {
        self.fired_at
    }
}
