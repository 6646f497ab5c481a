//! The human side of the race: one response instant, or a timeout.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// What the observer did within the PREDICT window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HumanResponse {
    /// Signaled at this simulation time.
    At(f64),
    /// No signal before the wall-clock deadline.
    TimedOut,
}

impl HumanResponse {
    /// Simulation time of the response, with `+∞` standing in for a timeout.
    pub fn time(&self) -> f64 {
        match self {
            HumanResponse::At(t) => *t,
            HumanResponse::TimedOut => f64::INFINITY,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HumanResponse::TimedOut)
    }
}

/// Captures a single human-origin timestamp. First write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HumanResponseWindow {
    t_predict: Option<f64>,
}

impl HumanResponseWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `t` unless a response is already held. Later calls are no-ops.
    pub fn predict(&mut self, t: f64) {
        if self.t_predict.is_none() {
            self.t_predict = Some(t);
        }
    }

    pub fn t_predict(&self) -> Option<f64> {
        self.t_predict
    }
}

/// Wall-clock deadline for the PREDICT window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    max_wait: Duration,
}

impl TimeoutPolicy {
    pub fn new(max_wait: Duration) -> Self {
        Self { max_wait }
    }

    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "max wait must be a finite non-negative number of seconds, got {secs}"
            )));
        }
        let max_wait = Duration::try_from_secs_f64(secs).map_err(|e| {
            Error::InvalidConfiguration(format!("max wait of {secs} s is out of range: {e}"))
        })?;
        Ok(Self::new(max_wait))
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// True once strictly more than `max_wait` has passed since `opened_at`.
    pub fn expired(&self, opened_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(opened_at) > self.max_wait
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
