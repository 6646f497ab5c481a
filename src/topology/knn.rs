//! Exact k-nearest-neighbor search by brute force.
//!
//! For every point we scan all other points and keep the k closest in a
//! bounded max-heap (the farthest kept candidate sits at the root and is
//! evicted first). O(N² D) overall, which is fine for the few hundred
//! points an observer can follow on screen.
//!
//! Ties on distance are broken by point index, so the same cloud always
//! yields the same neighbor lists. Scoring treats the lists as unordered
//! sets, so the tie rule only has to be deterministic, not meaningful.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use smallvec::SmallVec;

use crate::model::PointCloud;

/// The k nearest neighbors of one point, nearest first. Never contains
/// the point itself.
pub type NeighborSet = SmallVec<[usize; 16]>;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    dist_sq: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger distance = higher priority (gets popped first)
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.idx.cmp(&other.idx))
    }
}

/// k nearest neighbors of point `i`, excluding `i` itself.
pub fn neighbors_of(cloud: &PointCloud, i: usize, k: usize) -> NeighborSet {
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

    for j in 0..cloud.len() {
        if j == i {
            continue;
        }
        let cand = Candidate { idx: j, dist_sq: cloud.distance_sq(i, j) };

        // Early pruning: if heap is full and this point is no closer than the worst, skip
        if heap.len() >= k {
            match heap.peek() {
                Some(worst) if cand >= *worst => continue,
                _ => {}
            }
        }

        heap.push(cand);
        if heap.len() > k {
            heap.pop();
        }
    }

    heap.into_sorted_vec().into_iter().map(|c| c.idx).collect()
}

/// k nearest neighbors of every point, indexed by point.
pub fn all_neighbors(cloud: &PointCloud, k: usize) -> Vec<NeighborSet> {
    (0..cloud.len()).map(|i| neighbors_of(cloud, i, k)).collect()
}

/// Number of indices shared by two neighbor sets.
pub fn shared_count(a: &[usize], b: &[usize]) -> usize {
    a.iter().filter(|x| b.contains(x)).count()
}
