//! Per-frame structural drift: neighbor overlap and edge-length stress.
//!
//! Both metrics are pure functions of `(snapshot, reference)`. Neither
//! keeps anything between calls, and they are computed independently.

use crate::model::{ScoreSample, Snapshot};
use crate::{Error, Result};

use super::knn;
use super::ReferenceTopology;

/// Stand-in for an original edge length of exactly zero (coincident points).
pub const DEGENERATE_LENGTH: f64 = 1e-9;

#[inline]
pub(crate) fn stabilize(length: f64) -> f64 {
    if length == 0.0 { DEGENERATE_LENGTH } else { length }
}

/// Scores snapshots of the same N points against a [`ReferenceTopology`].
#[derive(Debug, Clone, Copy)]
pub struct TopologyMetric<'r> {
    reference: &'r ReferenceTopology,
}

impl<'r> TopologyMetric<'r> {
    pub fn new(reference: &'r ReferenceTopology) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &'r ReferenceTopology {
        self.reference
    }

    /// Neighbor-overlap score.
    ///
    /// Recomputes the k-NN sets of the snapshot with the reference's k and
    /// returns, per point, `|ref(i) ∩ cur(i)| / k` together with the mean S.
    /// S = 1 means every neighborhood survived, S = 0 total disjointness.
    pub fn score(&self, snapshot: &Snapshot) -> Result<ScoreSample> {
        self.check_len(snapshot)?;
        let k = self.reference.k();
        let current = knn::all_neighbors(&snapshot.points, k);

        let per_point: Vec<f64> = self
            .reference
            .neighbor_sets()
            .iter()
            .zip(&current)
            .map(|(r, c)| knn::shared_count(r, c) as f64 / k as f64)
            .collect();
        let score = per_point.iter().sum::<f64>() / per_point.len() as f64;

        Ok(ScoreSample { t: snapshot.t, score, per_point })
    }

    /// Mean ratio of current to original length over the fixed reference edges.
    ///
    /// 1.0 under any length-preserving transform; drifts under shear or
    /// normalization. The edge set is never recomputed.
    pub fn stress(&self, snapshot: &Snapshot) -> Result<f64> {
        self.check_len(snapshot)?;
        let edges = self.reference.edges();
        let total: f64 = edges
            .iter()
            .zip(self.reference.original_lengths())
            .map(|(e, &orig)| snapshot.points.distance(e.lo(), e.hi()) / orig)
            .sum();
        Ok(total / edges.len() as f64)
    }

    fn check_len(&self, snapshot: &Snapshot) -> Result<()> {
        let expected = self.reference.len();
        let got = snapshot.points.len();
        if got != expected {
            return Err(Error::DimensionMismatch { expected, got });
        }
        Ok(())
    }
}
