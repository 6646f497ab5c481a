//! Per-tick score samples and displayable frames.

use serde::{Deserialize, Serialize};

use super::Snapshot;

/// One scored tick: `(t, S, per_point_overlap)`.
///
/// `per_point` is only used for coloring; control logic reads `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSample {
    pub t: f64,
    /// Mean neighbor-overlap score S in [0, 1].
    pub score: f64,
    /// Fraction of each point's reference neighbors still among its current neighbors.
    pub per_point: Vec<f64>,
}

/// Everything a renderer needs to draw one moment: the projected
/// snapshots of every transform variant plus the overlap coloring.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub projections: Vec<Snapshot>,
    pub colors: Vec<f64>,
}
