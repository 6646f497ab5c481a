//! The per-tick driver: score, detect, then arbitrate by priority.

use std::time::Instant;

use crate::detect::{DeathDetector, HumanResponse};
use crate::model::{Frame, ScoreSample, Snapshot};
use crate::topology::TopologyMetric;
use crate::Result;

use super::outcome::{classify, ResultRecord};
use super::signal::{signal_slot, SignalReceiver, SignalSender};
use super::{ExperimentState, MachineSettings, Mode, Transition};

/// What the external pipeline hands back for one simulation time.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Snapshot in the scoring space (2D for the monitored branch).
    pub monitored: Snapshot,
    /// Views for the renderer, e.g. one projection per transform variant.
    /// Empty means "show the monitored snapshot".
    pub views: Vec<Snapshot>,
}

impl Observation {
    pub fn monitored(monitored: Snapshot) -> Self {
        Self { monitored, views: Vec::new() }
    }
}

/// Inputs to one application of the transition rules.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Simulation time of this tick.
    pub t: f64,
    /// Latched death time, already updated with this tick's score.
    pub t_death: Option<f64>,
    /// Wall-clock instant of an observer signal drained this tick.
    pub signal: Option<Instant>,
    /// Wall-clock read for the PREDICT deadline.
    pub now: Instant,
    pub settings: &'a MachineSettings,
}

/// Apply the transition rules for one tick, in strict priority order.
///
/// `live` is the frame computed this tick; it is copied into the state
/// only when the PREDICT window opens.
pub fn advance(
    mut state: ExperimentState,
    ctx: TickContext<'_>,
    live: &Frame,
) -> (ExperimentState, Option<Transition>) {
    // Priority 1: death overrides every mode, every tick.
    if ctx.t_death.is_some() {
        state.mode = Mode::Dead;
        if !state.death_reported {
            state.death_reported = true;
            return (state, Some(Transition::Died));
        }
        return (state, None);
    }

    match state.mode {
        // Priority 2: open the window.
        Mode::Observe if ctx.t > ctx.settings.prediction_start => {
            state.mode = Mode::Predict;
            state.window_opened_at = Some(ctx.now);
            state.frozen = Some(live.clone());
            (state, Some(Transition::EnterPredict))
        }
        // Priority 3: close the window on a signal, else on the deadline.
        Mode::Predict => {
            if ctx.signal.is_some() {
                state.window.predict(ctx.t);
                let t_human = state.window.t_predict().unwrap_or(ctx.t);
                state.human = Some(HumanResponse::At(t_human));
                state.mode = Mode::Done;
                return (state, Some(Transition::Responded));
            }
            let opened = state.window_opened_at.unwrap_or(ctx.now);
            if ctx.settings.timeout.expired(opened, ctx.now) {
                state.human = Some(HumanResponse::TimedOut);
                state.mode = Mode::Done;
                return (state, Some(Transition::TimedOut));
            }
            (state, None)
        }
        Mode::Observe | Mode::Done | Mode::Dead => (state, None),
    }
}

/// Result of one tick, handed to the renderer.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub t: f64,
    pub sample: ScoreSample,
    pub stress: f64,
    pub mode: Mode,
    pub transition: Option<Transition>,
    /// Show the frozen frame instead of `live`.
    pub show_frozen: bool,
    /// Dead, and the observer either never answered or answered too late.
    pub too_late: bool,
    /// Simulation time passed the safety bound; stop ticking.
    pub finished: bool,
    pub live: Frame,
}

/// Owns the per-trial state and drives it one tick at a time.
pub struct ExperimentStateMachine<'r> {
    metric: TopologyMetric<'r>,
    settings: MachineSettings,
    detector: DeathDetector,
    signals: SignalReceiver,
    state: ExperimentState,
    ticks: u64,
    t: f64,
}

impl<'r> ExperimentStateMachine<'r> {
    pub fn new(metric: TopologyMetric<'r>, settings: MachineSettings) -> (Self, SignalSender) {
        let (sender, signals) = signal_slot();
        (Self::with_signals(metric, settings, signals), sender)
    }

    /// Build over an existing signal slot whose senders are already handed out.
    pub fn with_signals(
        metric: TopologyMetric<'r>,
        settings: MachineSettings,
        signals: SignalReceiver,
    ) -> Self {
        Self {
            metric,
            settings,
            detector: DeathDetector::new(settings.detector),
            signals,
            state: ExperimentState::new(),
            ticks: 0,
            t: 0.0,
        }
    }

    /// Advance one fixed step.
    ///
    /// `observe` maps the new simulation time to the pipeline's snapshot.
    /// Scoring and the detector update always complete before any
    /// transition is evaluated.
    pub fn tick<F>(&mut self, now: Instant, observe: F) -> Result<TickReport>
    where
        F: FnOnce(f64) -> Result<Observation>,
    {
        self.ticks += 1;
        self.t = self.ticks as f64 * self.settings.dt;
        let t = self.t;

        let Observation { monitored, views } = observe(t)?;
        let sample = self.metric.score(&monitored)?;
        let stress = self.metric.stress(&monitored)?;
        self.detector.update(t, sample.score);

        // Drained every tick: a signal outside PREDICT is dropped, not deferred.
        let signal = self.signals.take();

        let projections = if views.is_empty() { vec![monitored] } else { views };
        let live = Frame { projections, colors: sample.per_point.clone() };

        let ctx = TickContext {
            t,
            t_death: self.detector.t_death(),
            signal,
            now,
            settings: &self.settings,
        };
        let state = std::mem::take(&mut self.state);
        let (state, transition) = advance(state, ctx, &live);
        self.state = state;

        if let Some(tr) = transition {
            self.log_transition(tr, now);
        }

        let mode = self.state.mode;
        let too_late = mode == Mode::Dead
            && match (self.state.human, self.detector.t_death()) {
                (None, _) => true,
                (Some(h), Some(t_death)) => h.time() >= t_death,
                (Some(_), None) => false,
            };

        Ok(TickReport {
            t,
            stress,
            mode,
            transition,
            show_frozen: mode == Mode::Predict,
            too_late,
            finished: t > self.settings.max_sim_time,
            sample,
            live,
        })
    }

    fn log_transition(&self, tr: Transition, now: Instant) {
        let t = self.t;
        match tr {
            Transition::Died => {
                tracing::info!(t_death = ?self.detector.t_death(), "death detected");
            }
            Transition::EnterPredict => {
                tracing::info!(t, "entered PREDICT, view frozen");
            }
            Transition::Responded => {
                let waited = self
                    .state
                    .window_opened_at
                    .map(|opened| now.saturating_duration_since(opened).as_secs_f64());
                tracing::info!(t_human = t, waited_secs = ?waited, "observer responded");
            }
            Transition::TimedOut => {
                tracing::info!(
                    max_wait_secs = self.settings.timeout.max_wait().as_secs_f64(),
                    "observer timed out"
                );
            }
        }
    }

    /// The frame a renderer should draw for `report`.
    pub fn displayed<'a>(&'a self, report: &'a TickReport) -> &'a Frame {
        match (&self.state.frozen, report.show_frozen) {
            (Some(frozen), true) => frozen,
            _ => &report.live,
        }
    }

    /// Classify the trial from the latched death time and the human response.
    pub fn finalize(&self) -> ResultRecord {
        if self.state.mode == Mode::Predict {
            tracing::warn!(t = self.t, "run ended with the PREDICT window still open");
        }
        let record = classify(self.detector.t_death(), self.state.human);
        tracing::info!(
            t_death = ?record.t_death,
            t_human = record.t_human.time(),
            outcome = %record.outcome,
            delta_t = ?record.delta_t,
            "trial finished"
        );
        record
    }

    /// A new sender for the observer signal slot.
    pub fn responder(&self) -> SignalSender {
        self.signals.sender()
    }

    pub fn state(&self) -> &ExperimentState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn detector(&self) -> &DeathDetector {
        &self.detector
    }

    pub fn settings(&self) -> &MachineSettings {
        &self.settings
    }

    /// Current simulation time.
    pub fn t(&self) -> f64 {
        self.t
    }
}
