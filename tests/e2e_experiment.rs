//! End-to-end tests for the experiment state machine.
//!
//! Drives `ExperimentStateMachine::tick` with hand-built snapshots and
//! synthetic wall-clock instants, so timeouts are exercised without sleeping.
//! The last test runs a full headless trial through `Experiment::run`.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use topodeath::detect::{DetectorPolicy, RatePolicy, TimeoutPolicy};
use topodeath::experiment::{
    classify, signal_slot, CloudConfig, ExperimentConfig, MachineSettings, Observation,
};
use topodeath::runner::{Experiment, FrameSink};
use topodeath::{
    ExperimentStateMachine, Frame, HumanResponse, Mode, Outcome, PointCloud, ReferenceTopology,
    Snapshot, TickReport, TopologyMetric, Transition,
};

// ============================================================================
// Helpers: four tight pairs on a line (k = 1), intact or with partners swapped
// ============================================================================

const PAIRS: usize = 4;

fn intact() -> PointCloud {
    let rows: Vec<Vec<f64>> = (0..PAIRS)
        .flat_map(|m| [vec![10.0 * m as f64, 0.0], vec![10.0 * m as f64 + 1.0, 0.0]])
        .collect();
    PointCloud::from_rows(&rows).unwrap()
}

/// Every odd point moves next to the following pair: overlap drops to 0.
fn scrambled() -> PointCloud {
    let rows: Vec<Vec<f64>> = (0..PAIRS)
        .flat_map(|m| {
            let next = ((m + 1) % PAIRS) as f64;
            [vec![10.0 * m as f64, 0.0], vec![10.0 * next + 1.0, 0.0]]
        })
        .collect();
    PointCloud::from_rows(&rows).unwrap()
}

fn settings(prediction_start: f64, max_wait_secs: f64) -> MachineSettings {
    MachineSettings {
        dt: 0.1,
        prediction_start,
        max_sim_time: 2.0,
        detector: DetectorPolicy::default(),
        timeout: TimeoutPolicy::from_secs_f64(max_wait_secs).unwrap(),
    }
}

fn intact_at(t: f64) -> topodeath::Result<Observation> {
    Ok(Observation::monitored(Snapshot::new(t, intact())))
}

fn scrambled_at(t: f64) -> topodeath::Result<Observation> {
    Ok(Observation::monitored(Snapshot::new(t, scrambled())))
}

// ============================================================================
// 1. The fixtures mean what they say
// ============================================================================

#[test]
fn test_fixture_scores() {
    let topo = ReferenceTopology::build(intact(), 1).unwrap();
    let metric = TopologyMetric::new(&topo);
    assert_eq!(metric.score(&Snapshot::new(0.0, intact())).unwrap().score, 1.0);
    assert_eq!(metric.score(&Snapshot::new(0.0, scrambled())).unwrap().score, 0.0);
}

// ============================================================================
// 2. PREDICT opens at t=0.3, nobody answers, 3 s later the window times out
// ============================================================================

#[test]
fn test_predict_window_times_out() {
    let topo = ReferenceTopology::build(intact(), 1).unwrap();
    let (mut machine, _sender) =
        ExperimentStateMachine::new(TopologyMetric::new(&topo), settings(0.25, 3.0));
    let base = Instant::now();

    for _ in 0..2 {
        let r = machine.tick(base, intact_at).unwrap();
        assert_eq!(r.mode, Mode::Observe);
        assert!(!r.show_frozen);
    }

    let r = machine.tick(base, intact_at).unwrap();
    assert_eq!(r.transition, Some(Transition::EnterPredict));
    assert!((r.t - 0.3).abs() < 1e-9);
    assert!(r.show_frozen);
    assert_eq!(machine.state().window_opened_at, Some(base));

    let r = machine.tick(base + Duration::from_millis(2900), intact_at).unwrap();
    assert_eq!(r.mode, Mode::Predict);
    let r = machine.tick(base + Duration::from_secs(3), intact_at).unwrap();
    assert_eq!(r.mode, Mode::Predict, "deadline is strict");

    let r = machine.tick(base + Duration::from_millis(3010), intact_at).unwrap();
    assert_eq!(r.transition, Some(Transition::TimedOut));
    assert_eq!(r.mode, Mode::Done);
    assert_eq!(machine.state().human, Some(HumanResponse::TimedOut));
    assert!(!r.show_frozen);

    let record = machine.finalize();
    assert_eq!(record.outcome, Outcome::NoDeathObserved);
    assert_eq!(record.t_human.time(), f64::INFINITY);
}

// ============================================================================
// 3. Death and a pending timeout on the same tick: DEAD wins
// ============================================================================

#[test]
fn test_death_overrides_expired_window() {
    let topo = ReferenceTopology::build(intact(), 1).unwrap();
    let (mut machine, _sender) =
        ExperimentStateMachine::new(TopologyMetric::new(&topo), settings(0.0, 1.0));
    let base = Instant::now();

    // first tick: baseline, and t=0.1 > 0 opens the window
    let r = machine.tick(base, intact_at).unwrap();
    assert_eq!(r.transition, Some(Transition::EnterPredict));

    let late = base + Duration::from_secs(5);
    let r = machine.tick(late, scrambled_at).unwrap();
    assert_eq!(r.mode, Mode::Dead);
    assert_eq!(r.transition, Some(Transition::Died));
    assert!(r.too_late);
    assert!(!r.show_frozen);
    assert_eq!(machine.state().human, None);

    // recovery does not revive it, and the death notice is not repeated
    let r = machine.tick(late, intact_at).unwrap();
    assert_eq!(r.mode, Mode::Dead);
    assert_eq!(r.transition, None);
    assert_eq!(r.sample.score, 1.0);

    let record = machine.finalize();
    assert_eq!(record.outcome, Outcome::HumanTooLate);
    assert!((record.t_death.unwrap() - 0.2).abs() < 1e-9);
}

// ============================================================================
// 4. Observer answers inside the window, then death follows
// ============================================================================

#[test]
fn test_response_then_death_is_anticipation() {
    let topo = ReferenceTopology::build(intact(), 1).unwrap();
    let (mut machine, sender) =
        ExperimentStateMachine::new(TopologyMetric::new(&topo), settings(0.15, 3.0));
    let base = Instant::now();

    // a press during OBSERVE is drained and forgotten
    sender.signal_at(base);
    let r = machine.tick(base, intact_at).unwrap();
    assert_eq!(r.mode, Mode::Observe);

    let r = machine.tick(base, intact_at).unwrap();
    assert_eq!(r.transition, Some(Transition::EnterPredict));
    let r = machine.tick(base, intact_at).unwrap();
    assert_eq!(r.mode, Mode::Predict, "stale press must not count");

    sender.signal_at(base + Duration::from_millis(500));
    sender.signal_at(base + Duration::from_millis(600));
    let r = machine.tick(base + Duration::from_millis(700), intact_at).unwrap();
    assert_eq!(r.transition, Some(Transition::Responded));
    assert_eq!(r.mode, Mode::Done);
    let t_human = r.t;

    let r = machine.tick(base + Duration::from_secs(9), scrambled_at).unwrap();
    assert_eq!(r.mode, Mode::Dead);
    assert!(!r.too_late);

    let record = machine.finalize();
    assert_eq!(record.outcome, Outcome::HumanAnticipated);
    assert_eq!(record.t_human, HumanResponse::At(t_human));
    assert!((record.delta_t.unwrap() - 0.1).abs() < 1e-9);
    assert_eq!(record, classify(record.t_death, Some(record.t_human)));
}

// ============================================================================
// 5. Frozen frame is the one captured when PREDICT opened
// ============================================================================

#[test]
fn test_displayed_frame_is_frozen_during_predict() {
    let topo = ReferenceTopology::build(intact(), 1).unwrap();
    let (mut machine, _sender) =
        ExperimentStateMachine::new(TopologyMetric::new(&topo), settings(0.05, 3.0));
    let base = Instant::now();

    let opened = machine.tick(base, intact_at).unwrap();
    assert_eq!(opened.transition, Some(Transition::EnterPredict));
    let frozen_t = opened.live.projections[0].t;

    let r = machine.tick(base, intact_at).unwrap();
    assert!(r.show_frozen);
    let shown = machine.displayed(&r);
    assert_eq!(shown.projections[0].t, frozen_t);
    assert_ne!(r.live.projections[0].t, frozen_t);
    assert_eq!(shown.colors, vec![1.0; 2 * PAIRS]);
}

// ============================================================================
// 6. A full headless trial terminates and finalizes consistently
// ============================================================================

#[derive(Default)]
struct Recorder {
    modes: Vec<Mode>,
    frozen_ticks: usize,
    finished: bool,
}

impl FrameSink for Recorder {
    fn present(&mut self, report: &TickReport, shown: &Frame) -> topodeath::Result<()> {
        assert!(!self.finished, "tick after the run finished");
        self.modes.push(report.mode);
        if report.show_frozen {
            self.frozen_ticks += 1;
            assert!(shown.projections[0].t <= report.t);
        }
        assert_eq!(shown.projections.len(), 3);
        self.finished = report.finished;
        Ok(())
    }
}

#[test]
fn test_headless_run_with_simulated_observer() {
    let config = ExperimentConfig {
        neighbors: 6,
        max_wait_secs: 60.0,
        frame_interval_ms: 0,
        observer: RatePolicy { sensitivity: 0.0, reaction_delay: 1 },
        cloud: CloudConfig { points: 80, dims: 6, noise: 0.05 },
        ..ExperimentConfig::default()
    };
    let experiment = Experiment::from_config(config.clone()).unwrap();
    let (_sender, signals) = signal_slot();
    let mut sink = Recorder::default();

    let record = experiment.run(&mut sink, signals, Some(config.observer)).unwrap();

    assert!(sink.finished);
    // 2.0 / 0.005 ticks, plus the one that crosses the bound
    assert!(sink.modes.len() >= 400 && sink.modes.len() <= 402);
    assert_eq!(sink.modes[0], Mode::Observe);
    assert_eq!(record, classify(record.t_death, Some(record.t_human)));
    if let Some(delta) = record.delta_t {
        assert!(delta > 0.0);
    }
    // once dead, always dead
    if let Some(first_dead) = sink.modes.iter().position(|m| *m == Mode::Dead) {
        assert!(sink.modes[first_dead..].iter().all(|m| *m == Mode::Dead));
    }
}
