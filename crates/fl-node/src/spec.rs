//! Node specifications.

use fl_core::{ConvexPolygon, NodeId, Point, Time};

use crate::{NodeError, NodeResult};

/// Everything needed to bring a node into existence.
///
/// `shape` is the footprint relative to the node's reference point: a node
/// at location `p` occupies `shape` translated by `p`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpecification {
    pub id: NodeId,
    pub shape: ConvexPolygon,
    /// Metres per second.
    pub max_speed: f64,
    pub initial_location: Point,
    pub initial_time: Time,
}

impl NodeSpecification {
    /// Distance from the reference point to the farthest footprint vertex.
    pub fn radius(&self) -> f64 {
        self.shape.radius_about(Point::default())
    }

    pub fn validate(&self) -> NodeResult<()> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(NodeError::InvalidSpecification(format!(
                "{}: max speed must be positive, got {}",
                self.id, self.max_speed
            )));
        }
        if !self.initial_location.is_finite() {
            return Err(NodeError::InvalidSpecification(format!("{}: initial location is not finite", self.id)));
        }
        if !self.initial_time.is_finite() {
            return Err(NodeError::InvalidSpecification(format!("{}: initial time is not finite", self.id)));
        }
        if !self.shape.contains(Point::default()) {
            return Err(NodeError::InvalidSpecification(format!(
                "{}: footprint must contain its reference point",
                self.id
            )));
        }
        Ok(())
    }
}
