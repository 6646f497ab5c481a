//! Trial configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```json
//! { "neighbors": 8, "max_wait_secs": 5.0, "variant": "linear" }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detect::{DetectorPolicy, RatePolicy, TimeoutPolicy};
use crate::pipeline::TransformVariant;
use crate::{Error, Result};

/// Parameters of the synthetic ring cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub points: usize,
    pub dims: usize,
    pub noise: f64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self { points: 400, dims: 10, noise: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// k for the reference graph and every per-tick k-NN.
    pub neighbors: usize,
    /// Simulation time advanced per tick.
    pub dt: f64,
    /// Simulation time after which the PREDICT window opens.
    pub prediction_start: f64,
    /// Wall-clock seconds the observer gets inside PREDICT.
    pub max_wait_secs: f64,
    /// The run ends once simulation time exceeds this.
    pub max_sim_time: f64,
    /// Death when S < death_ratio × baseline.
    pub death_ratio: f64,
    /// Wall-clock pause between ticks in the headless driver.
    pub frame_interval_ms: u64,
    pub observer: RatePolicy,
    pub cloud: CloudConfig,
    pub seed: u64,
    /// The transform whose projection is scored.
    pub variant: TransformVariant,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            neighbors: 10,
            dt: 0.005,
            prediction_start: 0.3,
            max_wait_secs: 3.0,
            max_sim_time: 2.0,
            death_ratio: 0.8,
            frame_interval_ms: 10,
            observer: RatePolicy::default(),
            cloud: CloudConfig::default(),
            seed: 7,
            variant: TransformVariant::LinearNormalized,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.machine_settings()?;

        self.observer.validate()?;
        let lag = self.observer.reaction_delay;
        if lag as f64 * self.dt > self.max_sim_time {
            return Err(invalid(format!(
                "observer reaction delay of {lag} ticks outlasts the {} s run",
                self.max_sim_time
            )));
        }

        let CloudConfig { points, dims, noise } = self.cloud;
        if points < 2 {
            return Err(invalid(format!("cloud needs at least 2 points, got {points}")));
        }
        if self.neighbors == 0 || self.neighbors >= points {
            return Err(invalid(format!(
                "neighbor count must satisfy 0 < k < N, got k={}, N={points}",
                self.neighbors
            )));
        }
        if dims < 2 {
            return Err(invalid(format!("cloud needs at least 2 dimensions, got {dims}")));
        }
        if !noise.is_finite() || noise < 0.0 {
            return Err(invalid(format!("noise must be finite and non-negative, got {noise}")));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// The subset of settings the state machine runs on, validated.
    pub fn machine_settings(&self) -> Result<MachineSettings> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid(format!("time step must be positive, got {}", self.dt)));
        }
        if !(self.prediction_start.is_finite() && self.prediction_start >= 0.0) {
            return Err(invalid(format!(
                "prediction start must be finite and non-negative, got {}",
                self.prediction_start
            )));
        }
        if !(self.max_sim_time.is_finite() && self.max_sim_time > 0.0) {
            return Err(invalid(format!(
                "simulation bound must be positive, got {}",
                self.max_sim_time
            )));
        }
        Ok(MachineSettings {
            dt: self.dt,
            prediction_start: self.prediction_start,
            max_sim_time: self.max_sim_time,
            detector: DetectorPolicy::new(self.death_ratio)?,
            timeout: TimeoutPolicy::from_secs_f64(self.max_wait_secs)?,
        })
    }
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfiguration(msg)
}

/// Validated state-machine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineSettings {
    pub dt: f64,
    pub prediction_start: f64,
    pub max_sim_time: f64,
    pub detector: DetectorPolicy,
    pub timeout: TimeoutPolicy,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            dt: 0.005,
            prediction_start: 0.3,
            max_sim_time: 2.0,
            detector: DetectorPolicy::default(),
            timeout: TimeoutPolicy::default(),
        }
    }
}
