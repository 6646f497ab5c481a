//! Undirected reference edge between two point indices.

use serde::{Deserialize, Serialize};

/// An undirected edge, always stored as `(min index, max index)` so that
/// `(i, j)` and `(j, i)` collapse to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    lo: usize,
    hi: usize,
}

impl Edge {
    /// Canonicalize an unordered pair.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}
