//! Moving obstacles.

use fl_core::{ConvexPolygon, Envelope};

use crate::Trajectory;

/// A convex footprint carried along a trajectory.
///
/// `shape` is expressed relative to the trajectory's reference point, so the
/// occupied area at time `t` is `shape` translated to `trajectory(t)`.
/// Outside the trajectory's span the obstacle does not exist.
#[derive(Clone, Debug)]
pub struct DynamicObstacle {
    pub shape: ConvexPolygon,
    pub trajectory: Trajectory,
}

impl DynamicObstacle {
    pub fn new(shape: ConvexPolygon, trajectory: Trajectory) -> Self {
        Self { shape, trajectory }
    }

    /// The same obstacle with its footprint grown by `radius`.  A node of
    /// that radius plans its reference point against this.
    #[must_use]
    pub fn buffered(&self, radius: f64) -> Self {
        Self { shape: self.shape.buffered(radius), trajectory: self.trajectory.clone() }
    }

    /// Everything the obstacle ever covers.
    pub fn envelope(&self) -> Option<Envelope> {
        let path_env = self.trajectory.envelope()?;
        let shape_env = self.shape.envelope();
        Some(Envelope {
            min: path_env.min + shape_env.min.to_vector(),
            max: path_env.max + shape_env.max.to_vector(),
        })
    }
}
