//! Immutable polyline with cached cumulative arc lengths.

use fl_core::{Envelope, Point};

use crate::{TrajectoryError, TrajectoryResult};

/// One straight piece of a [`SpatialPath`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathSegment {
    /// Position of the segment within the path (0-based).
    pub index: usize,
    pub from: Point,
    pub to: Point,
    /// Arc length at `from`.
    pub start_arc: f64,
    /// Arc length at `to`.
    pub finish_arc: f64,
}

impl PathSegment {
    #[inline]
    pub fn length(&self) -> f64 {
        self.finish_arc - self.start_arc
    }
}

/// An ordered sequence of zero or at least two points.
///
/// `arcs[i]` is the distance travelled along the path up to `points[i]`;
/// it is non-decreasing and `arcs[0] == 0`.  Repeated points are allowed
/// (zero-length segments), which is how a composed trajectory represents a
/// wait.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialPath {
    points: Vec<Point>,
    arcs: Vec<f64>,
}

impl SpatialPath {
    pub fn new(points: Vec<Point>) -> TrajectoryResult<Self> {
        if points.len() == 1 {
            return Err(TrajectoryError::SingleVertex);
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(TrajectoryError::NonFinite(i));
        }
        let mut arcs = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                acc += points[i - 1].distance(*p);
            }
            arcs.push(acc);
        }
        Ok(Self { points, arcs })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-length path standing at `p`; the route between two identical
    /// locations.
    pub fn degenerate(p: Point) -> Self {
        Self { points: vec![p, p], arcs: vec![0.0, 0.0] }
    }

    /// Straight line from `a` to `b`.
    pub fn line(a: Point, b: Point) -> Self {
        Self { points: vec![a, b], arcs: vec![0.0, a.distance(b)] }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn arcs(&self) -> &[f64] {
        &self.arcs
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.arcs.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn finish(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn envelope(&self) -> Option<Envelope> {
        Envelope::from_points(self.points.iter().copied())
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.points.windows(2).enumerate().map(|(i, w)| PathSegment {
            index: i,
            from: w[0],
            to: w[1],
            start_arc: self.arcs[i],
            finish_arc: self.arcs[i + 1],
        })
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Location at `arc`, clamped into `[0, length]`.  `None` for an empty
    /// path.
    pub fn point_at(&self, arc: f64) -> Option<Point> {
        let first = *self.points.first()?;
        if arc <= 0.0 {
            return Some(first);
        }
        let i = self.arcs.partition_point(|&a| a < arc);
        if i >= self.points.len() {
            return self.points.last().copied();
        }
        let (a0, a1) = (self.arcs[i - 1], self.arcs[i]);
        if a1 - a0 <= 0.0 {
            return Some(self.points[i]);
        }
        Some(self.points[i - 1].lerp(self.points[i], (arc - a0) / (a1 - a0)))
    }

    /// Indices of vertices whose arc lies strictly inside `(lo, hi)`.
    pub(crate) fn vertices_between(&self, lo: f64, hi: f64) -> std::ops::Range<usize> {
        let start = self.arcs.partition_point(|&a| a <= lo);
        let end = self.arcs.partition_point(|&a| a < hi);
        start..end.max(start)
    }

    /// Append `other`, which must begin where `self` ends.
    pub fn concat(&self, other: &SpatialPath, tolerance: f64) -> TrajectoryResult<SpatialPath> {
        match (self.finish(), other.start()) {
            (None, _) => Ok(other.clone()),
            (_, None) => Ok(self.clone()),
            (Some(a), Some(b)) => {
                if !a.approx_eq(b, tolerance) {
                    return Err(TrajectoryError::Core(fl_core::CoreError::Geometry(format!(
                        "paths do not connect: {a} vs {b}"
                    ))));
                }
                let mut points = self.points.clone();
                points.extend_from_slice(&other.points[1..]);
                SpatialPath::new(points)
            }
        }
    }
}
