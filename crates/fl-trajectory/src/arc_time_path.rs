//! Motion profiles along a fixed route: `(arc, time)` polylines.

use fl_core::Point;

use crate::{TrajectoryError, TrajectoryResult};

/// A vertex of the arc-time plane.  `time` is relative to the profile's
/// base time, in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcTime {
    pub arc: f64,
    pub time: f64,
}

impl ArcTime {
    #[inline]
    pub const fn new(arc: f64, time: f64) -> Self {
        Self { arc, time }
    }

    /// The vertex as a planar point (`x = arc`, `y = time`) for geometric
    /// predicates.
    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(self.arc, self.time)
    }

    #[inline]
    pub fn from_point(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Causal arc-time polyline: arcs `>= 0`, times strictly increasing.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcTimePath {
    vertices: Vec<ArcTime>,
}

impl ArcTimePath {
    pub fn new(vertices: Vec<ArcTime>) -> TrajectoryResult<Self> {
        if vertices.len() == 1 {
            return Err(TrajectoryError::SingleVertex);
        }
        for (i, v) in vertices.iter().enumerate() {
            if !(v.arc.is_finite() && v.time.is_finite()) {
                return Err(TrajectoryError::NonFinite(i));
            }
            if v.arc < 0.0 {
                return Err(TrajectoryError::NegativeArc(i));
            }
            if i > 0 && v.time <= vertices[i - 1].time {
                return Err(TrajectoryError::NotCausal(i));
            }
        }
        Ok(Self { vertices })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[ArcTime] {
        &self.vertices
    }

    pub fn start(&self) -> Option<ArcTime> {
        self.vertices.first().copied()
    }

    pub fn finish(&self) -> Option<ArcTime> {
        self.vertices.last().copied()
    }

    pub fn duration(&self) -> f64 {
        match (self.start(), self.finish()) {
            (Some(s), Some(f)) => f.time - s.time,
            _ => 0.0,
        }
    }

    pub fn max_arc(&self) -> f64 {
        self.vertices.iter().map(|v| v.arc).fold(0.0, f64::max)
    }

    /// Largest `|Δarc / Δtime|` over all segments.
    pub fn max_speed(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| ((w[1].arc - w[0].arc) / (w[1].time - w[0].time)).abs())
            .fold(0.0, f64::max)
    }
}
