//! Point clouds and timed snapshots.

use nalgebra::DMatrix;

use crate::{Error, Result};

/// An immutable set of N points in D-dimensional real space.
///
/// Stored as an N × D matrix: row `i` is point `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    coords: DMatrix<f64>,
}

impl PointCloud {
    /// Wrap an N × D matrix (one point per row).
    pub fn from_matrix(coords: DMatrix<f64>) -> Self {
        Self { coords }
    }

    /// Build a cloud from explicit rows. All rows must share one length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dims = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dims) {
            return Err(Error::InvalidConfiguration(format!(
                "row {i} has {} coordinates, expected {dims}",
                row.len()
            )));
        }
        let coords = DMatrix::from_fn(rows.len(), dims, |r, c| rows[r][c]);
        Ok(Self { coords })
    }

    /// Number of points (N).
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    /// Dimensionality of every point (D).
    pub fn dims(&self) -> usize {
        self.coords.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.coords
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.coords
    }

    /// Coordinates of point `i`.
    pub fn point(&self, i: usize) -> Vec<f64> {
        self.coords.row(i).iter().copied().collect()
    }

    /// Squared Euclidean distance between points `i` and `j`.
    #[inline]
    pub fn distance_sq(&self, i: usize, j: usize) -> f64 {
        (0..self.coords.ncols())
            .map(|c| {
                let d = self.coords[(i, c)] - self.coords[(j, c)];
                d * d
            })
            .sum()
    }

    /// Euclidean distance between points `i` and `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_sq(i, j).sqrt()
    }
}

/// The positions of all N points at simulation time `t`, in the space
/// used for scoring (2D for the monitored branch).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub t: f64,
    pub points: PointCloud,
}

impl Snapshot {
    pub fn new(t: f64, points: PointCloud) -> Self {
        Self { t, points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_shape() {
        let cloud = PointCloud::from_rows(&[vec![0.0, 0.0, 1.0], vec![3.0, 4.0, 1.0]]).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.dims(), 3);
        assert_eq!(cloud.point(1), vec![3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = PointCloud::from_rows(&[vec![0.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_distance() {
        let cloud = PointCloud::from_rows(&[vec![0.0, 0.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(cloud.distance_sq(0, 1), 25.0);
        assert_eq!(cloud.distance(1, 0), 5.0);
        assert_eq!(cloud.distance(0, 0), 0.0);
    }
}
