//! # Reference Topology
//!
//! The ground truth every later frame is compared against: the k-NN
//! graph of the original high-dimensional cloud, built exactly once.
//!
//! ```text
//! original cloud ──knn──▶ neighbor sets ──fold (min,max)──▶ edge set
//!                              │                               │
//!                              ▼                               ▼
//!                     TopologyMetric::score        TopologyMetric::stress
//! ```
//!
//! Both the neighbor sets and the edge set are frozen at construction;
//! the metric only ever borrows them.

pub mod knn;
pub mod metric;

use hashbrown::HashSet;

use crate::model::{Edge, PointCloud};
use crate::{Error, Result};

pub use knn::NeighborSet;
pub use metric::{TopologyMetric, DEGENERATE_LENGTH};

/// Immutable k-NN graph over the original cloud.
#[derive(Debug, Clone)]
pub struct ReferenceTopology {
    k: usize,
    original: PointCloud,
    neighbors: Vec<NeighborSet>,
    edges: Vec<Edge>,
    /// Original high-dimensional length of `edges[e]`, epsilon-stabilized.
    original_lengths: Vec<f64>,
}

impl ReferenceTopology {
    /// Build the reference graph.
    ///
    /// Fails with [`Error::InvalidConfiguration`] if the cloud has fewer
    /// than two points, `k` is zero, or `k >= N`.
    pub fn build(original: PointCloud, k: usize) -> Result<Self> {
        let n = original.len();
        if n < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "reference cloud needs at least 2 points, got {n}"
            )));
        }
        if k == 0 || k >= n {
            return Err(Error::InvalidConfiguration(format!(
                "neighbor count must satisfy 0 < k < N, got k={k}, N={n}"
            )));
        }

        let neighbors = knn::all_neighbors(&original, k);

        let mut unique: HashSet<Edge> = HashSet::with_capacity(n * k);
        for (i, set) in neighbors.iter().enumerate() {
            for &j in set {
                unique.insert(Edge::new(i, j));
            }
        }
        let mut edges: Vec<Edge> = unique.into_iter().collect();
        edges.sort_unstable();

        let original_lengths = edges
            .iter()
            .map(|e| metric::stabilize(original.distance(e.lo(), e.hi())))
            .collect();

        tracing::debug!(points = n, neighbors = k, edges = edges.len(), "reference topology built");

        Ok(Self { k, original, neighbors, edges, original_lengths })
    }

    /// Neighbor count, fixed for the lifetime of this reference.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of points in the reference cloud.
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn original(&self) -> &PointCloud {
        &self.original
    }

    /// Per-point reference neighbors, `neighbor_sets()[i]` nearest first.
    pub fn neighbor_sets(&self) -> &[NeighborSet] {
        &self.neighbors
    }

    /// Unique undirected edges in canonical `(min, max)` form, sorted.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn original_lengths(&self) -> &[f64] {
        &self.original_lengths
    }
}
