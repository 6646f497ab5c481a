//! Synthetic point clouds.

use std::f64::consts::TAU;

use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::model::PointCloud;

/// A noisy unit ring: uniform angles on the circle spanned by the first
/// two axes, plus Gaussian noise of standard deviation `noise` on every
/// axis. `dims` must be at least 2.
pub fn make_ring<R: Rng>(points: usize, dims: usize, noise: f64, rng: &mut R) -> PointCloud {
    let mut coords = DMatrix::<f64>::zeros(points, dims);
    for i in 0..points {
        let angle = rng.gen_range(0.0..TAU);
        coords[(i, 0)] = angle.cos();
        coords[(i, 1)] = angle.sin();
    }
    for i in 0..points {
        for c in 0..dims {
            let n: f64 = rng.sample(StandardNormal);
            coords[(i, c)] += noise * n;
        }
    }
    PointCloud::from_matrix(coords)
}
