//! Forbidden regions: where in the arc-time plane a route may not be.
//!
//! # Coordinates
//!
//! The plane has `x = arc` (distance along the route) and `y = time`
//! relative to a base instant.  A profile is legal if it never enters the
//! interior of any region; running along a boundary or touching a corner is
//! fine.
//!
//! # Construction
//!
//! For every pair of a route segment and an obstacle trajectory segment whose
//! bounding boxes meet, the obstacle footprint is mapped into the plane.  The
//! reference point is at `P0 + σ·d` at arc `s0 + σ`, the obstacle at
//! `Q0 + θ·v` at time `τ0 + θ`, so a collision is
//!
//! ```text
//! σ·d − θ·v = y + (Q0 − P0)      for some y in the footprint
//! ```
//!
//! Three cases follow from the 2×2 basis `[d, −v]`:
//!
//! 1. zero-length route segment: only the first and last are kept, as a thin
//!    box around their arc over the instants the obstacle covers the point;
//! 2. `d` and `v` (nearly) parallel: the footprint is projected onto the
//!    route line, giving a band `za ≤ σ − λθ ≤ zb` with `λ = v·d`;
//! 3. otherwise the basis is inverted and the footprint mapped affinely.
//!
//! Each result is clipped to the segment's arc range and the obstacle
//! segment's time range.  Pieces from one obstacle form one
//! [`ForbiddenRegion`]; regions of different obstacles are never merged.

use rstar::{RTree, RTreeObject, AABB};
use tracing::trace;

use fl_core::{ConvexPolygon, Envelope, Point, Time, Vector, EPSILON};
use fl_trajectory::{DynamicObstacle, PathSegment, SpatialPath, TrajectorySegment};

/// Below this ratio of `|d × v|` to `|d · v|` the basis counts as singular.
const SINGULAR_TAN: f64 = 1e-10;

/// Offset used to look at both sides of a shared piece boundary.
const NUDGE: f64 = 1e-7;

/// Narrowest box kept for a zero-length segment.
const MIN_POINT_BUFFER: f64 = 1e-7;

// ── ForbiddenRegion ───────────────────────────────────────────────────────────

/// The union of convex arc-time pieces caused by one obstacle.
#[derive(Clone, Debug)]
pub struct ForbiddenRegion {
    /// Index of the causing obstacle in the slice the region was built from.
    pub obstacle: usize,
    pieces: Vec<ConvexPolygon>,
    envelope: Envelope,
}

impl ForbiddenRegion {
    /// `None` if `pieces` is empty.
    pub fn new(obstacle: usize, pieces: Vec<ConvexPolygon>) -> Option<Self> {
        let envelope = pieces.iter().map(ConvexPolygon::envelope).reduce(Envelope::merged)?;
        Some(Self { obstacle, pieces, envelope })
    }

    pub fn pieces(&self) -> &[ConvexPolygon] {
        &self.pieces
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Every piece corner.  These are the mesh's candidate vertices.
    pub fn corners(&self) -> impl Iterator<Item = Point> + '_ {
        self.pieces.iter().flat_map(|p| p.vertices().iter().copied())
    }

    /// `true` if `p` is in the interior of the union, including points on a
    /// seam between two pieces.
    pub fn contains_strict(&self, p: Point) -> bool {
        if !self.envelope.contains(p) {
            return false;
        }
        if self.pieces.iter().any(|piece| piece.contains_strict(p)) {
            return true;
        }
        let nudges = [
            Vector::new(NUDGE, 0.0),
            Vector::new(-NUDGE, 0.0),
            Vector::new(0.0, NUDGE),
            Vector::new(0.0, -NUDGE),
        ];
        self.pieces.iter().any(|piece| piece.contains(p))
            && nudges.iter().all(|&o| self.pieces.iter().any(|piece| piece.contains(p + o)))
    }

    /// `true` if the segment `a→b` runs through the interior of the union.
    pub fn crosses(&self, a: Point, b: Point) -> bool {
        let env = Envelope::from_point(a).including(b);
        if !self.envelope.intersects(&env) {
            return false;
        }
        let len = a.distance(b);
        self.pieces.iter().any(|piece| match piece.clip_segment(a, b) {
            Some((t0, t1)) if (t1 - t0) * len > EPSILON => self.contains_strict(a.lerp(b, 0.5 * (t0 + t1))),
            _ => false,
        })
    }

    /// Smallest ray parameter `λ ∈ [0, hi]` at which `origin + λ·dir` enters
    /// the interior, if it does.
    pub fn first_entry(&self, origin: Point, dir: Vector, hi: f64) -> Option<f64> {
        let scale = dir.norm();
        self.pieces
            .iter()
            .filter_map(|piece| {
                let (l0, l1) = piece.clip_line(origin, dir, 0.0, hi)?;
                let inside = (l1 - l0) * scale > EPSILON
                    && self.contains_strict(origin + dir * (0.5 * (l0 + l1)));
                inside.then_some(l0)
            })
            .min_by(f64::total_cmp)
    }
}

// ── R-tree of route segments ──────────────────────────────────────────────────

#[derive(Clone)]
struct SegmentEntry {
    min: [f64; 2],
    max: [f64; 2],
    segment: PathSegment,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Forbidden regions of `path` for `obstacles`, with times relative to `base`.
///
/// `obstacles` must already be grown by the planning node's radius.
/// `arc_buffer` extends pieces from the first and last route segments past
/// the route ends.
pub fn build_forbidden_regions(
    path: &SpatialPath,
    obstacles: &[DynamicObstacle],
    base: Time,
    arc_buffer: f64,
) -> Vec<ForbiddenRegion> {
    let count = path.segment_count();
    if count == 0 {
        return Vec::new();
    }
    let entries: Vec<SegmentEntry> = path
        .segments()
        .map(|s| {
            let env = Envelope::from_point(s.from).including(s.to);
            SegmentEntry { min: [env.min.x, env.min.y], max: [env.max.x, env.max.y], segment: s }
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut regions = Vec::new();
    for (index, obstacle) in obstacles.iter().enumerate() {
        let shape_env = obstacle.shape.envelope();
        let mut pieces = Vec::new();
        for oseg in obstacle.trajectory.segments() {
            let swept = Envelope {
                min: oseg.from + shape_env.min.to_vector(),
                max: oseg.from + shape_env.max.to_vector(),
            }
            .merged(Envelope {
                min: oseg.to + shape_env.min.to_vector(),
                max: oseg.to + shape_env.max.to_vector(),
            });
            let query = AABB::from_corners([swept.min.x, swept.min.y], [swept.max.x, swept.max.y]);
            for entry in tree.locate_in_envelope_intersecting(&query) {
                let seg = entry.segment;
                let first = seg.index == 0;
                let last = seg.index + 1 == count;
                if let Some(piece) = piece_for(&seg, first, last, &obstacle.shape, &oseg, base, arc_buffer) {
                    pieces.push(piece);
                }
            }
        }
        if let Some(region) = ForbiddenRegion::new(index, pieces) {
            regions.push(region);
        }
    }
    trace!(
        segments = count,
        obstacles = obstacles.len(),
        regions = regions.len(),
        "forbidden regions built"
    );
    regions
}

/// The arc-time footprint of one obstacle segment on one route segment.
fn piece_for(
    seg: &PathSegment,
    first: bool,
    last: bool,
    shape: &ConvexPolygon,
    oseg: &TrajectorySegment,
    base: Time,
    arc_buffer: f64,
) -> Option<ConvexPolygon> {
    let (tau0, tau1) = (oseg.start_time - base, oseg.finish_time - base);
    let v = oseg.velocity();
    let offset = seg.from - oseg.from; // P0 − Q0

    let Some(d) = (seg.to - seg.from).normalized().filter(|_| seg.length() > EPSILON) else {
        if !(first || last) {
            return None;
        }
        return point_piece(seg.start_arc, offset, v, tau0, tau1, shape, arc_buffer.max(MIN_POINT_BUFFER));
    };

    let s_lo = if first { seg.start_arc - arc_buffer } else { seg.start_arc };
    let s_hi = if last { seg.finish_arc + arc_buffer } else { seg.finish_arc };
    let window = Envelope { min: Point::new(s_lo, tau0), max: Point::new(s_hi, tau1) };

    let cross = d.cross(v);
    if cross.abs() <= SINGULAR_TAN * d.dot(v).abs() || v.norm() <= EPSILON {
        // y = (P0 − Q0) + z·d must lie in the footprint, z = σ − λθ.
        let lambda = v.dot(d);
        let (za, zb) = shape.clip_line(Point::ORIGIN + offset, d, f64::NEG_INFINITY, f64::INFINITY)?;
        let rect = ConvexPolygon::rectangle(window.min, window.max).ok()?;
        let (s0, t0) = (seg.start_arc, tau0);
        return rect
            .clip_half_plane(Vector::new(1.0, -lambda), zb + s0 - lambda * t0)?
            .clip_half_plane(Vector::new(-1.0, lambda), -za - s0 + lambda * t0);
    }

    // (σ, θ) = M⁻¹ · w with M = [d, −v] and w = y − (P0 − Q0).
    let det = -cross;
    let (s0, t0) = (seg.start_arc, tau0);
    shape
        .mapped(|y| {
            let w = y.to_vector() - offset;
            let sigma = (-v.y * w.x + v.x * w.y) / det;
            let theta = (-d.y * w.x + d.x * w.y) / det;
            Point::new(s0 + sigma, t0 + theta)
        })?
        .clip_envelope(&window)
}

/// Thin box around `arc` over the instants at which the obstacle covers the
/// route point.
fn point_piece(
    arc: f64,
    offset: Vector,
    v: Vector,
    tau0: f64,
    tau1: f64,
    shape: &ConvexPolygon,
    half_width: f64,
) -> Option<ConvexPolygon> {
    // P0 − Q(θ) = (P0 − Q0) − θ·v must lie in the footprint.
    let origin = Point::ORIGIN + offset;
    let (ta, tb) = shape.clip_line(origin, -v, 0.0, tau1 - tau0)?;
    if tb - ta <= EPSILON || !shape.contains_strict(origin - v * (0.5 * (ta + tb))) {
        return None;
    }
    ConvexPolygon::rectangle(
        Point::new(arc - half_width, tau0 + ta),
        Point::new(arc + half_width, tau0 + tb),
    )
    .ok()
}
