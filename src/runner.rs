//! Headless tick driver.
//!
//! Wires the pipeline into the state machine and paces it in wall-clock
//! time. Presentation is delegated to a [`FrameSink`]; the observer's
//! signal arrives through a [`SignalReceiver`] the caller provides.
//!
//! ```text
//! loop {
//!     transforms(t) ─▶ projection ─▶ machine.tick ─▶ sink.present
//!     stop once t > max_sim_time
//! }
//! ```

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::detect::{RateObserver, RatePolicy};
use crate::experiment::{
    ExperimentConfig, ExperimentStateMachine, Mode, Observation, ResultRecord, SignalReceiver,
    TickReport,
};
use crate::model::{Frame, PointCloud};
use crate::pipeline::{make_ring, transform, FixedProjection, Transform};
use crate::topology::{ReferenceTopology, TopologyMetric};
use crate::{Error, Result};

/// Receives every tick along with the frame that should be on screen.
pub trait FrameSink {
    fn present(&mut self, report: &TickReport, shown: &Frame) -> Result<()>;
}

/// Discards frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _report: &TickReport, _shown: &Frame) -> Result<()> {
        Ok(())
    }
}

/// Logs ticks through `tracing` instead of drawing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink {
    /// Log every n-th tick; transitions are always logged.
    pub every: u64,
    ticks: u64,
}

impl LogSink {
    pub fn new(every: u64) -> Self {
        Self { every, ticks: 0 }
    }
}

impl FrameSink for LogSink {
    fn present(&mut self, report: &TickReport, _shown: &Frame) -> Result<()> {
        self.ticks += 1;
        if report.transition.is_some() || (self.every > 0 && self.ticks % self.every == 0) {
            tracing::debug!(
                t = report.t,
                score = report.sample.score,
                stress = report.stress,
                mode = %report.mode,
                frozen = report.show_frozen,
                too_late = report.too_late,
                "tick"
            );
        }
        Ok(())
    }
}

/// One configured trial: the reference cloud and everything that deforms
/// and projects it.
pub struct Experiment {
    config: ExperimentConfig,
    reference: ReferenceTopology,
    transforms: Vec<Box<dyn Transform>>,
    projection: FixedProjection,
    monitored: usize,
}

impl Experiment {
    /// Generate the ring, transforms and projection from `config.seed`.
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let cloud = config.cloud;
        let original = make_ring(cloud.points, cloud.dims, cloud.noise, &mut rng);
        let transforms = transform::standard_set(cloud.dims, &mut rng);
        let projection = FixedProjection::new(cloud.dims, &mut rng);
        Self::new(config, original, transforms, projection)
    }

    /// Assemble a trial from explicit parts.
    pub fn new(
        config: ExperimentConfig,
        original: PointCloud,
        transforms: Vec<Box<dyn Transform>>,
        projection: FixedProjection,
    ) -> Result<Self> {
        config.machine_settings()?;
        let monitored = transforms
            .iter()
            .position(|tf| tf.variant() == config.variant)
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!("no transform for variant {}", config.variant))
            })?;
        let reference = ReferenceTopology::build(original, config.neighbors)?;
        Ok(Self { config, reference, transforms, projection, monitored })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceTopology {
        &self.reference
    }

    /// Project every variant at time `t`; the configured one is scored.
    pub fn observe(&self, t: f64) -> Result<Observation> {
        let views = self
            .transforms
            .iter()
            .map(|tf| {
                let moved = tf.step(self.reference.original(), t)?;
                self.projection.project_snapshot(t, &moved)
            })
            .collect::<Result<Vec<_>>>()?;
        let monitored = views[self.monitored].clone();
        Ok(Observation { monitored, views })
    }

    /// Run until the simulation bound and classify the trial.
    ///
    /// With `observer` set, a [`RateObserver`] watches the score while the
    /// PREDICT window is open and signals on its first alarm, standing in
    /// for a human at the keyboard.
    pub fn run<S: FrameSink>(
        &self,
        sink: &mut S,
        signals: SignalReceiver,
        observer: Option<RatePolicy>,
    ) -> Result<ResultRecord> {
        let settings = self.config.machine_settings()?;
        let metric = TopologyMetric::new(&self.reference);
        let mut machine = ExperimentStateMachine::with_signals(metric, settings, signals);
        let responder = machine.responder();
        let mut observer = observer.map(RateObserver::new);
        let interval = self.config.frame_interval();

        tracing::info!(
            variant = %self.config.variant,
            points = self.reference.len(),
            neighbors = self.reference.k(),
            "experiment started"
        );

        loop {
            let report = machine.tick(Instant::now(), |t| self.observe(t))?;

            if report.mode == Mode::Predict {
                if let Some(obs) = observer.as_mut() {
                    if obs.observe(report.t, report.sample.score) {
                        responder.signal();
                    }
                }
            }

            sink.present(&report, machine.displayed(&report))?;

            if report.finished {
                break;
            }
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }

        Ok(machine.finalize())
    }
}
