//! Fixed linear projection to the viewing plane.

use nalgebra::DMatrix;
use rand::Rng;

use crate::model::{PointCloud, Snapshot};
use crate::{Error, Result};

use super::transform::gaussian_matrix;

/// D × 2 Gaussian matrix with unit-norm columns, drawn once.
#[derive(Debug, Clone)]
pub struct FixedProjection {
    basis: DMatrix<f64>,
}

impl FixedProjection {
    pub fn new<R: Rng>(dims: usize, rng: &mut R) -> Self {
        let raw = gaussian_matrix(dims, 2, rng);
        let norms = [raw.column(0).norm(), raw.column(1).norm()];
        let basis = DMatrix::from_fn(dims, 2, |r, c| raw[(r, c)] / norms[c]);
        Self { basis }
    }

    pub fn basis(&self) -> &DMatrix<f64> {
        &self.basis
    }

    pub fn project(&self, cloud: &PointCloud) -> Result<PointCloud> {
        if cloud.dims() != self.basis.nrows() {
            return Err(Error::InvalidConfiguration(format!(
                "projection expects {}-dimensional points, got {}",
                self.basis.nrows(),
                cloud.dims()
            )));
        }
        Ok(PointCloud::from_matrix(cloud.matrix() * &self.basis))
    }

    pub fn project_snapshot(&self, t: f64, cloud: &PointCloud) -> Result<Snapshot> {
        Ok(Snapshot::new(t, self.project(cloud)?))
    }
}
