//! # Stimulus Pipeline
//!
//! The replaceable collaborators that feed the core: a synthetic cloud,
//! the deforming transforms, and a fixed projection to the screen plane.
//! None of these carry invariants; the core only relies on point
//! identity (row order) being preserved through every stage.
//!
//! ```text
//! make_ring ─▶ X0 ─▶ Transform::step(X0, t) ─▶ FixedProjection::project ─▶ 2D snapshot
//! ```

pub mod generate;
pub mod projection;
pub mod transform;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use generate::make_ring;
pub use projection::FixedProjection;
pub use transform::{LinearInterpNormalized, LinearInterpolation, OrthogonalRotation, Transform};

/// The transform families an observer can be shown.
///
/// The serde names double as the command-line values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum TransformVariant {
    #[serde(rename = "orthogonal")]
    #[value(name = "orthogonal")]
    Orthogonal,
    #[serde(rename = "linear")]
    #[value(name = "linear")]
    Linear,
    #[serde(rename = "linear-norm")]
    #[value(name = "linear-norm", alias = "linear+norm")]
    LinearNormalized,
}

impl TransformVariant {
    pub const ALL: [TransformVariant; 3] = [
        TransformVariant::Orthogonal,
        TransformVariant::Linear,
        TransformVariant::LinearNormalized,
    ];

    /// Display label; also the `mode` column of the results log.
    pub fn label(&self) -> &'static str {
        match self {
            TransformVariant::Orthogonal => "Orthogonal",
            TransformVariant::Linear => "Linear",
            TransformVariant::LinearNormalized => "Linear+Norm",
        }
    }

    /// Position in [`TransformVariant::ALL`].
    pub fn index(&self) -> usize {
        match self {
            TransformVariant::Orthogonal => 0,
            TransformVariant::Linear => 1,
            TransformVariant::LinearNormalized => 2,
        }
    }
}

impl std::fmt::Display for TransformVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
