//! # Point-Cloud Model
//!
//! Plain data types that cross every boundary:
//! pipeline ↔ topology ↔ detection ↔ experiment ↔ renderer/logger.
//!
//! Design rule: point identity is the row index. Every snapshot of the
//! same experiment holds the same N points in the same order, so metrics
//! can compare index `i` in the reference against index `i` now.
//! This module is pure data: no I/O, no state, no clocks.

pub mod cloud;
pub mod edge;
pub mod sample;

pub use cloud::{PointCloud, Snapshot};
pub use edge::Edge;
pub use sample::{Frame, ScoreSample};
