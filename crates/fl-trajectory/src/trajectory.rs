//! Space-time curves.
//!
//! A [`Trajectory`] is either given directly as a spatial path with one
//! timestamp per vertex, or composed from a route, a motion profile along
//! that route and a base time.  The composed form is what the pathfinders
//! produce; its vertex list is only materialised on first access and then
//! cached, so building a candidate that is never read costs nothing.
//!
//! Invariants for every value: timestamps strictly increasing, and never
//! exactly one vertex.  The one exception is [`Trajectory::instant`], the
//! zero-duration curve a pathfinder returns when there is nothing to do.

use std::sync::OnceLock;

use fl_core::{Envelope, Point, Time};

use crate::{ArcTimePath, SpatialPath, TrajectoryError, TrajectoryResult};

#[derive(Clone, Debug)]
enum Repr {
    Simple {
        path: SpatialPath,
        times: Vec<Time>,
    },
    Composite {
        route: SpatialPath,
        profile: ArcTimePath,
        base: Time,
        composed: OnceLock<(SpatialPath, Vec<Time>)>,
    },
}

/// A piece of a trajectory between two consecutive vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrajectorySegment {
    pub from: Point,
    pub to: Point,
    pub start_time: Time,
    pub finish_time: Time,
}

impl TrajectorySegment {
    /// Constant velocity over the segment, in units per second.
    pub fn velocity(&self) -> fl_core::Vector {
        (self.to - self.from) * (1.0 / (self.finish_time - self.start_time))
    }
}

/// A space-time curve with strictly increasing timestamps.
#[derive(Clone, Debug)]
pub struct Trajectory {
    repr: Repr,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Trajectory {
    fn eq(&self, other: &Self) -> bool {
        self.times() == other.times() && self.path() == other.path()
    }
}

impl Trajectory {
    // ── Construction ──────────────────────────────────────────────────────

    /// Direct form: one timestamp per path vertex.
    pub fn new(path: SpatialPath, times: Vec<Time>) -> TrajectoryResult<Self> {
        if path.len() != times.len() {
            return Err(TrajectoryError::LengthMismatch {
                expected: path.len(),
                got:      times.len(),
                what:     "trajectory timestamps",
            });
        }
        if let Some(i) = times.iter().position(|t| !t.is_finite()) {
            return Err(TrajectoryError::NonFinite(i));
        }
        if let Some(i) = (1..times.len()).find(|&i| times[i] <= times[i - 1]) {
            return Err(TrajectoryError::NotCausal(i));
        }
        Ok(Self { repr: Repr::Simple { path, times } })
    }

    /// Composed form: `profile` drives motion along `route`, with profile
    /// time 0 mapped to `base`.
    pub fn composite(route: SpatialPath, profile: ArcTimePath, base: Time) -> TrajectoryResult<Self> {
        if profile.is_empty() {
            return Ok(Self::empty());
        }
        if route.is_empty() {
            return Err(TrajectoryError::LengthMismatch {
                expected: 2,
                got:      0,
                what:     "route vertices for a non-empty profile",
            });
        }
        let max_arc = profile.max_arc();
        if max_arc > route.length() + 1e-9 {
            return Err(TrajectoryError::ArcOutOfRange { arc: max_arc, length: route.length() });
        }
        if !base.is_finite() {
            return Err(TrajectoryError::NonFinite(0));
        }
        Ok(Self {
            repr: Repr::Composite { route, profile, base, composed: OnceLock::new() },
        })
    }

    /// Standing still at `p` over `[from, to]`.
    pub fn stationary(p: Point, from: Time, to: Time) -> TrajectoryResult<Self> {
        if to <= from {
            return Err(TrajectoryError::EmptyInterval { from, to });
        }
        Self::new(SpatialPath::new(vec![p, p])?, vec![from, to])
    }

    /// Two vertices at `p`, both at `t`.
    pub fn instant(p: Point, t: Time) -> Self {
        Self { repr: Repr::Simple { path: SpatialPath::degenerate(p), times: vec![t, t] } }
    }

    /// [`stationary`](Self::stationary) over `[from, to]`, or an
    /// [`instant`](Self::instant) at `from` when the span is empty.
    pub fn hold(p: Point, from: Time, to: Time) -> TrajectoryResult<Self> {
        if to <= from { Ok(Self::instant(p, from)) } else { Self::stationary(p, from, to) }
    }

    pub fn empty() -> Self {
        Self { repr: Repr::Simple { path: SpatialPath::empty(), times: Vec::new() } }
    }

    // ── Views ─────────────────────────────────────────────────────────────

    fn materialized(&self) -> (&SpatialPath, &[Time]) {
        match &self.repr {
            Repr::Simple { path, times } => (path, times.as_slice()),
            Repr::Composite { route, profile, base, composed } => {
                let (path, times) = composed.get_or_init(|| compose(route, profile, *base));
                (path, times.as_slice())
            }
        }
    }

    /// Spatial path through every vertex of the curve.
    pub fn path(&self) -> &SpatialPath {
        self.materialized().0
    }

    /// Timestamps, one per [`path`](Self::path) vertex.
    pub fn times(&self) -> &[Time] {
        self.materialized().1
    }

    pub fn is_empty(&self) -> bool {
        match &self.repr {
            Repr::Simple { times, .. } => times.is_empty(),
            Repr::Composite { profile, .. } => profile.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        self.times().len()
    }

    pub fn start_time(&self) -> Option<Time> {
        self.times().first().copied()
    }

    pub fn finish_time(&self) -> Option<Time> {
        self.times().last().copied()
    }

    pub fn start_location(&self) -> Option<Point> {
        self.path().start()
    }

    pub fn finish_location(&self) -> Option<Point> {
        self.path().finish()
    }

    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.finish_time()) {
            (Some(s), Some(f)) => f - s,
            _ => 0.0,
        }
    }

    pub fn envelope(&self) -> Option<Envelope> {
        self.path().envelope()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (Point, Time)> + '_ {
        let (path, times) = self.materialized();
        path.points().iter().copied().zip(times.iter().copied())
    }

    pub fn segments(&self) -> impl Iterator<Item = TrajectorySegment> + '_ {
        let (path, times) = self.materialized();
        path.points().windows(2).zip(times.windows(2)).map(|(p, t)| TrajectorySegment {
            from: p[0],
            to: p[1],
            start_time: t[0],
            finish_time: t[1],
        })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` if `t` lies within `[start_time, finish_time]`.
    pub fn covers(&self, t: Time) -> bool {
        matches!((self.start_time(), self.finish_time()), (Some(s), Some(f)) if s <= t && t <= f)
    }

    /// Interpolated location at `t`, or `None` outside the curve's span.
    pub fn location_at(&self, t: Time) -> Option<Point> {
        let (path, times) = self.materialized();
        let (&first, &last) = (times.first()?, times.last()?);
        if t < first || t > last {
            return None;
        }
        let points = path.points();
        let i = times.partition_point(|&x| x <= t);
        if i >= times.len() {
            return points.last().copied();
        }
        let (t0, t1) = (times[i - 1], times[i]);
        Some(points[i - 1].lerp(points[i], (t - t0) / (t1 - t0)))
    }

    /// `true` if every vertex is within `tolerance` of `p`.
    pub fn is_stationary_at(&self, p: Point, tolerance: f64) -> bool {
        self.path().points().iter().all(|q| q.approx_eq(p, tolerance))
    }

    /// `true` if the curve never leaves its start location.
    pub fn is_stationary(&self, tolerance: f64) -> bool {
        match self.start_location() {
            Some(p) => self.is_stationary_at(p, tolerance),
            None => true,
        }
    }

    // ── Derived curves ────────────────────────────────────────────────────

    /// The part of the curve within `[from, to]`, with interpolated end
    /// vertices.  Empty if the ranges overlap in less than a positive span.
    pub fn sub_trajectory(&self, from: Time, to: Time) -> Trajectory {
        let (Some(s), Some(f)) = (self.start_time(), self.finish_time()) else {
            return Trajectory::empty();
        };
        let (from, to) = (from.max(s), to.min(f));
        if from >= to {
            return Trajectory::empty();
        }
        let (path, times) = self.materialized();
        let (Some(p_from), Some(p_to)) = (self.location_at(from), self.location_at(to)) else {
            return Trajectory::empty();
        };

        let mut points = vec![p_from];
        let mut stamps = vec![from];
        for (p, &t) in path.points().iter().zip(times) {
            if t > from && t < to {
                points.push(*p);
                stamps.push(t);
            }
        }
        points.push(p_to);
        stamps.push(to);

        SpatialPath::new(points)
            .and_then(|path| Trajectory::new(path, stamps))
            .unwrap_or_default()
    }

    /// Append `other`, which must start when and where `self` finishes.
    pub fn concat(&self, other: &Trajectory, tolerance: f64) -> TrajectoryResult<Trajectory> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        let (Some(ft), Some(st)) = (self.finish_time(), other.start_time()) else {
            return Ok(self.clone());
        };
        let joins = ft.approx_eq(st, 1e-9)
            && matches!(
                (self.finish_location(), other.start_location()),
                (Some(a), Some(b)) if a.approx_eq(b, tolerance)
            );
        if !joins {
            return Err(TrajectoryError::Discontinuous(st));
        }
        let path = self.path().concat(other.path(), tolerance)?;
        let mut times = self.times().to_vec();
        times.extend_from_slice(&other.times()[1..]);
        Trajectory::new(path, times)
    }
}

/// Materialise a composed trajectory: one vertex per profile vertex plus one
/// for every route corner crossed in between.
fn compose(route: &SpatialPath, profile: &ArcTimePath, base: Time) -> (SpatialPath, Vec<Time>) {
    let vertices = profile.vertices();
    let mut points = Vec::with_capacity(vertices.len() + route.len());
    let mut times = Vec::with_capacity(vertices.len() + route.len());

    let at = |arc: f64| route.point_at(arc).unwrap_or_default();

    for (i, v) in vertices.iter().enumerate() {
        points.push(at(v.arc));
        times.push(base + v.time);

        let Some(next) = vertices.get(i + 1) else { break };
        let (lo, hi) = (v.arc.min(next.arc), v.arc.max(next.arc));
        if hi - lo <= 0.0 {
            continue;
        }
        let mut corners: Vec<usize> = route.vertices_between(lo, hi).collect();
        if next.arc < v.arc {
            corners.reverse();
        }
        for k in corners {
            let arc = route.arcs()[k];
            let alpha = (arc - v.arc) / (next.arc - v.arc);
            points.push(route.points()[k]);
            times.push(base + (v.time + alpha * (next.time - v.time)));
        }
    }

    // Composition preserves the invariants of its inputs; fall back to an
    // empty curve rather than panic if rounding ever breaks them.
    match SpatialPath::new(points) {
        Ok(path) => (path, times),
        Err(_) => (SpatialPath::empty(), Vec::new()),
    }
}
