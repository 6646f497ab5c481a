//! Time-parameterized deformations of the original cloud.
//!
//! Each transform blends the identity into a target matrix M as t goes
//! from 0 to 1: `X · ((1 − t)·I + t·M)`. At t = 0 every transform is the
//! identity, so the first scored frame matches the reference.

use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::model::PointCloud;
use crate::{Error, Result};

use super::TransformVariant;

/// Row-norm guard for [`LinearInterpNormalized`].
const NORM_EPS: f64 = 1e-8;

pub trait Transform: Send + Sync {
    fn variant(&self) -> TransformVariant;

    /// The cloud at simulation time `t`. Row order is preserved.
    fn step(&self, cloud: &PointCloud, t: f64) -> Result<PointCloud>;
}

pub(crate) fn gaussian_matrix<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |_, _| rng.sample(StandardNormal))
}

fn blend(cloud: &PointCloud, target: &DMatrix<f64>, t: f64) -> Result<DMatrix<f64>> {
    let dims = target.nrows();
    if cloud.dims() != dims {
        return Err(Error::InvalidConfiguration(format!(
            "transform expects {dims}-dimensional points, got {}",
            cloud.dims()
        )));
    }
    let mix = DMatrix::<f64>::identity(dims, dims) * (1.0 - t) + target * t;
    Ok(cloud.matrix() * mix)
}

/// Blend toward a random orthogonal matrix (Q factor of a Gaussian matrix).
///
/// Only the endpoints are rotations; intermediate blends are not rigid.
#[derive(Debug, Clone)]
pub struct OrthogonalRotation {
    rotation: DMatrix<f64>,
}

impl OrthogonalRotation {
    pub fn new<R: Rng>(dims: usize, rng: &mut R) -> Self {
        let rotation = gaussian_matrix(dims, dims, rng).qr().q();
        Self { rotation }
    }

    pub fn rotation(&self) -> &DMatrix<f64> {
        &self.rotation
    }
}

impl Transform for OrthogonalRotation {
    fn variant(&self) -> TransformVariant {
        TransformVariant::Orthogonal
    }

    fn step(&self, cloud: &PointCloud, t: f64) -> Result<PointCloud> {
        blend(cloud, &self.rotation, t).map(PointCloud::from_matrix)
    }
}

/// Blend toward a random Gaussian matrix (shear plus scale).
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    target: DMatrix<f64>,
}

impl LinearInterpolation {
    pub fn new<R: Rng>(dims: usize, rng: &mut R) -> Self {
        Self { target: gaussian_matrix(dims, dims, rng) }
    }
}

impl Transform for LinearInterpolation {
    fn variant(&self) -> TransformVariant {
        TransformVariant::Linear
    }

    fn step(&self, cloud: &PointCloud, t: f64) -> Result<PointCloud> {
        blend(cloud, &self.target, t).map(PointCloud::from_matrix)
    }
}

/// [`LinearInterpolation`] followed by projecting every point onto the unit sphere.
#[derive(Debug, Clone)]
pub struct LinearInterpNormalized {
    target: DMatrix<f64>,
}

impl LinearInterpNormalized {
    pub fn new<R: Rng>(dims: usize, rng: &mut R) -> Self {
        Self { target: gaussian_matrix(dims, dims, rng) }
    }
}

impl Transform for LinearInterpNormalized {
    fn variant(&self) -> TransformVariant {
        TransformVariant::LinearNormalized
    }

    fn step(&self, cloud: &PointCloud, t: f64) -> Result<PointCloud> {
        let mut y = blend(cloud, &self.target, t)?;
        for mut row in y.row_iter_mut() {
            let norm = row.norm() + NORM_EPS;
            row.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(PointCloud::from_matrix(y))
    }
}

/// One transform per variant, all drawn from `rng`, in [`TransformVariant::ALL`] order.
pub fn standard_set<R: Rng>(dims: usize, rng: &mut R) -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(OrthogonalRotation::new(dims, rng)),
        Box::new(LinearInterpolation::new(dims, rng)),
        Box::new(LinearInterpNormalized::new(dims, rng)),
    ]
}
