//! Fixed-time and minimum-time pathfinders.
//!
//! Both take a fixed spatial route and find when to be where along it:
//! forbidden regions ([`region`](crate::region)) → mesh
//! ([`mesh`](crate::mesh)) → search ([`search`](crate::search)) → a
//! composed [`Trajectory`] starting at the query's start time.
//!
//! A query is a plain parameter record; each `find_*` call is a pure
//! function of it.

use tracing::trace;

use fl_core::{PlannerConfig, Point, Time, Vector, EPSILON};
use fl_trajectory::{ArcTime, ArcTimePath, DynamicObstacle, SpatialPath, Trajectory};

use crate::{
    build_forbidden_regions, connect_lazy, connect_simple, reachable_from, reverse_reachable, shortest_path,
    AllOf, ArcTimeError, ArcTimeMesh, ArcTimeResult, BoundsChecker, BufferChecker, EdgeChecker, ForbiddenRegion, LazyRays,
    MeshBuilder, SpeedChecker, VertexId, VisibilityChecker,
};

const TOLERANCE: f64 = 1e-9;
const START: VertexId = VertexId(0);
const FINISH: VertexId = VertexId(1);

// ── Settings and queries ──────────────────────────────────────────────────────

/// Mesh tunables, usually taken from [`PlannerConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshSettings {
    pub min_stop_duration: f64,
    pub arc_buffer: f64,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for MeshSettings {
    fn from(cfg: &PlannerConfig) -> Self {
        Self { min_stop_duration: cfg.min_stop_duration, arc_buffer: cfg.arc_buffer }
    }
}

/// Travel `route` over exactly `[start_time, finish_time]`.
///
/// `obstacles` must already be grown by the travelling node's radius.
#[derive(Copy, Clone, Debug)]
pub struct FixedTimeQuery<'a> {
    pub route: &'a SpatialPath,
    pub obstacles: &'a [DynamicObstacle],
    pub max_speed: f64,
    pub start_time: Time,
    pub finish_time: Time,
    pub settings: MeshSettings,
}

/// Travel `route` from `start_time`, arriving as early as possible within
/// `[earliest_finish_time, latest_finish_time]` and able to stay at the
/// route end for `buffer_duration` afterwards.
#[derive(Copy, Clone, Debug)]
pub struct MinimumTimeQuery<'a> {
    pub route: &'a SpatialPath,
    pub obstacles: &'a [DynamicObstacle],
    pub max_speed: f64,
    pub start_time: Time,
    pub earliest_finish_time: Time,
    pub latest_finish_time: Time,
    pub buffer_duration: f64,
    pub settings: MeshSettings,
}

fn validate(route: &SpatialPath, max_speed: f64, times: &[Time]) -> ArcTimeResult<()> {
    if route.is_empty() {
        return Err(ArcTimeError::InvalidQuery("route is empty".into()));
    }
    if !(max_speed.is_finite() && max_speed > 0.0) {
        return Err(ArcTimeError::InvalidQuery(format!("max speed must be positive, got {max_speed}")));
    }
    if let Some(t) = times.iter().find(|t| !t.is_finite()) {
        return Err(ArcTimeError::InvalidQuery(format!("non-finite time {t}")));
    }
    Ok(())
}

// ── Fixed time ────────────────────────────────────────────────────────────────

/// Collision-free traversal of the route over exactly the query window.
///
/// A zero-length window on a zero-length route needs no motion and yields
/// an [`instant`](Trajectory::instant) at the start.
pub fn find_fixed_time(q: &FixedTimeQuery<'_>) -> ArcTimeResult<Trajectory> {
    validate(q.route, q.max_speed, &[q.start_time, q.finish_time])?;
    let length = q.route.length();
    let horizon = q.finish_time - q.start_time;
    if horizon < 0.0 {
        return Err(ArcTimeError::InvalidQuery(format!(
            "finish {} precedes start {}",
            q.finish_time, q.start_time
        )));
    }
    if horizon <= TOLERANCE {
        if length > EPSILON {
            return Err(ArcTimeError::Infeasible);
        }
        return already_there(q.route, q.start_time, 0.0);
    }
    if length > q.max_speed * horizon * (1.0 + TOLERANCE) {
        return Err(ArcTimeError::Infeasible);
    }

    let regions = regions_for(q.route, q.obstacles, q.start_time, q.finish_time, q.settings.arc_buffer);
    let visibility = VisibilityChecker { regions: &regions };
    let (start, finish) = (ArcTime::new(0.0, 0.0), ArcTime::new(length, horizon));
    if !visibility.admits(start) || !visibility.admits(finish) {
        return Err(ArcTimeError::Infeasible);
    }

    let bounds = BoundsChecker { min_arc: 0.0, max_arc: length, min_time: 0.0, max_time: horizon, tolerance: TOLERANCE };
    let speed = SpeedChecker { max_speed: q.max_speed, tolerance: TOLERANCE };
    let checker = edge_rules(&bounds, &speed, &visibility);

    let seeded = seed(start, &[finish], &regions, &bounds, &visibility);
    let rays = LazyRays {
        regions: &regions,
        max_speed: q.max_speed,
        min_stop_duration: q.settings.min_stop_duration,
        min_arc: 0.0,
        max_arc: length,
        min_time: 0.0,
        max_time: horizon,
        finish: FINISH,
    };
    let profile = solve_lazy(seeded.clone(), &rays, &checker)
        .or_else(|| {
            let mut dense = seeded;
            connect_simple(&mut dense, &checker);
            solve(&dense.build(), FINISH)
        })
        .ok_or(ArcTimeError::Infeasible)?;
    compose(q.route, profile, q.start_time)
}

// ── Minimum time ──────────────────────────────────────────────────────────────

/// Earliest collision-free arrival at the route end within the query
/// window, followed by a free `buffer_duration`.
///
/// Finish candidates are the earliest admissible arrival, full-speed
/// arrivals from every region corner, every instant a region leaves the
/// route end, and every instant a region arrives there less the buffer.
/// A dense mesh up to the latest candidate picks the earliest reachable
/// one; the vertices that cannot lie on a path to it are pruned and the
/// sparse mesh is rebuilt over what remains.
pub fn find_minimum_time(q: &MinimumTimeQuery<'_>) -> ArcTimeResult<Trajectory> {
    validate(q.route, q.max_speed, &[q.start_time, q.earliest_finish_time, q.latest_finish_time])?;
    if !(q.buffer_duration.is_finite() && q.buffer_duration >= 0.0) {
        return Err(ArcTimeError::InvalidQuery(format!("invalid buffer duration {}", q.buffer_duration)));
    }
    let length = q.route.length();
    let lo = (q.earliest_finish_time - q.start_time).max(length / q.max_speed).max(0.0);
    let hi = q.latest_finish_time - q.start_time;
    if lo > hi + TOLERANCE {
        return Err(ArcTimeError::Infeasible);
    }
    let hi = hi.max(lo);

    let horizon_end = q.start_time + (hi + q.buffer_duration);
    let regions = regions_for(q.route, q.obstacles, q.start_time, horizon_end, q.settings.arc_buffer);
    let visibility = VisibilityChecker { regions: &regions };
    let buffer = BufferChecker { visibility, duration: q.buffer_duration };
    let start = ArcTime::new(0.0, 0.0);
    if !visibility.admits(start) {
        return Err(ArcTimeError::Infeasible);
    }

    let candidates = finish_candidates(&regions, length, q.max_speed, lo, hi, q.buffer_duration, &buffer);
    trace!(candidates = candidates.len(), "minimum-time finish candidates");
    let Some(&latest) = candidates.last() else {
        return Err(ArcTimeError::Infeasible);
    };
    if length <= EPSILON && candidates[0] <= TOLERANCE {
        // Already at the route end and free to stay.
        return already_there(q.route, q.start_time, candidates[0]);
    }

    // Dense pass: earliest reachable candidate.
    let bounds = BoundsChecker { min_arc: 0.0, max_arc: length, min_time: 0.0, max_time: latest, tolerance: TOLERANCE };
    let speed = SpeedChecker { max_speed: q.max_speed, tolerance: TOLERANCE };
    let checker = edge_rules(&bounds, &speed, &visibility);
    let finishes: Vec<ArcTime> = candidates.iter().map(|&t| ArcTime::new(length, t)).collect();
    let mut dense = seed(start, &finishes, &regions, &bounds, &visibility);
    connect_simple(&mut dense, &checker);
    let dense = dense.build();

    let reach = reachable_from(&dense, START);
    let chosen = (1..=finishes.len())
        .map(|i| VertexId(i as u32))
        .find(|v| reach[v.index()])
        .ok_or(ArcTimeError::Infeasible)?;
    let finish = dense.vertex(chosen);

    // Sparse pass over the pruned box.
    let back = reverse_reachable(&dense, chosen);
    let mut pruned = MeshBuilder::new();
    pruned.add_vertex(start);
    pruned.add_vertex(finish);
    for (i, v) in dense.vertices.iter().enumerate() {
        let id = VertexId(i as u32);
        if id != START && id != chosen && reach[i] && back[i] && v.time <= finish.time {
            pruned.add_vertex(*v);
        }
    }
    trace!(kept = pruned.vertex_count(), of = dense.vertex_count(), "pruned minimum-time mesh");

    let bounds = BoundsChecker { max_time: finish.time, ..bounds };
    let checker = edge_rules(&bounds, &speed, &visibility);
    let rays = LazyRays {
        regions: &regions,
        max_speed: q.max_speed,
        min_stop_duration: q.settings.min_stop_duration,
        min_arc: 0.0,
        max_arc: length,
        min_time: 0.0,
        max_time: finish.time,
        finish: FINISH,
    };
    let profile = solve_lazy(pruned, &rays, &checker)
        .or_else(|| {
            let path = shortest_path(&dense, START, chosen)?;
            Some(path.into_iter().map(|v| dense.vertex(v)).collect())
        })
        .ok_or(ArcTimeError::Infeasible)?;
    compose(q.route, profile, q.start_time)
}

/// Admissible arrival times at the route end, ascending and deduplicated.
///
/// An earliest arrival either runs at full speed from the start or from a
/// region corner, or waits at the route end for a region to leave; a later
/// one may be forced by a region arriving before the buffer runs out.
fn finish_candidates(
    regions: &[ForbiddenRegion],
    length: f64,
    max_speed: f64,
    lo: f64,
    hi: f64,
    buffer_duration: f64,
    buffer: &BufferChecker<'_>,
) -> Vec<f64> {
    let mut raw = vec![lo];
    raw.extend(
        regions
            .iter()
            .flat_map(ForbiddenRegion::corners)
            .filter(|c| c.x <= length)
            .map(|c| c.y + (length - c.x.max(0.0)) / max_speed),
    );
    let end = Point::new(length, 0.0);
    for piece in regions.iter().flat_map(ForbiddenRegion::pieces) {
        if let Some((ta, tb)) = piece.clip_line(end, Vector::new(0.0, 1.0), f64::NEG_INFINITY, f64::INFINITY) {
            if tb - ta > EPSILON {
                raw.push(tb);
                raw.push(ta - buffer_duration);
            }
        }
    }
    let mut out: Vec<f64> = raw
        .into_iter()
        .filter(|&t| t >= lo - TOLERANCE && t <= hi + TOLERANCE)
        .map(|t| t.clamp(lo, hi))
        .filter(|&t| buffer.admits(ArcTime::new(length, t)))
        .collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| (*a - *b).abs() <= TOLERANCE);
    out
}

// ── Shared steps ──────────────────────────────────────────────────────────────

/// Regions for obstacles clipped to `[from, to]`, relative to `from`.
fn regions_for(
    route: &SpatialPath,
    obstacles: &[DynamicObstacle],
    from: Time,
    to: Time,
    arc_buffer: f64,
) -> Vec<ForbiddenRegion> {
    let clipped: Vec<DynamicObstacle> = obstacles
        .iter()
        .map(|o| DynamicObstacle::new(o.shape.clone(), o.trajectory.sub_trajectory(from, to)))
        .collect();
    build_forbidden_regions(route, &clipped, from, arc_buffer)
}

/// Builder holding the start (vertex 0), the finishes (1..) and every free
/// region corner inside the box.
fn seed(
    start: ArcTime,
    finishes: &[ArcTime],
    regions: &[ForbiddenRegion],
    bounds: &BoundsChecker,
    visibility: &VisibilityChecker<'_>,
) -> MeshBuilder {
    let mut b = MeshBuilder::new();
    b.add_vertex(start);
    for &f in finishes {
        b.add_vertex(f);
    }
    for corner in regions.iter().flat_map(ForbiddenRegion::corners) {
        let v = ArcTime::from_point(corner);
        if bounds.contains(v) && visibility.admits(v) {
            b.add_vertex(v);
        }
    }
    b
}

fn edge_rules<'a>(
    bounds: &'a BoundsChecker,
    speed: &'a SpeedChecker,
    visibility: &'a VisibilityChecker<'_>,
) -> AllOf<'a> {
    let checks: Vec<&'a dyn EdgeChecker> = vec![bounds, speed, visibility];
    AllOf(checks)
}

fn solve_lazy(mut builder: MeshBuilder, rays: &LazyRays<'_>, checker: &AllOf<'_>) -> Option<Vec<ArcTime>> {
    connect_lazy(&mut builder, rays, checker);
    solve(&builder.build(), rays.finish)
}

fn solve(mesh: &ArcTimeMesh, finish: VertexId) -> Option<Vec<ArcTime>> {
    let path = shortest_path(mesh, START, finish)?;
    Some(path.into_iter().map(|v| mesh.vertex(v)).collect())
}

/// The degenerate result for a query already satisfied at its start: the
/// route's point held for `elapsed` seconds, two vertices either way.
fn already_there(route: &SpatialPath, start: Time, elapsed: f64) -> ArcTimeResult<Trajectory> {
    let here = route.start().ok_or_else(|| ArcTimeError::InvalidQuery("route is empty".into()))?;
    Ok(Trajectory::hold(here, start, start + elapsed)?)
}

fn compose(route: &SpatialPath, profile: Vec<ArcTime>, base: Time) -> ArcTimeResult<Trajectory> {
    let length = route.length();
    let vertices = profile
        .into_iter()
        .map(|v| ArcTime::new(v.arc.clamp(0.0, length), v.time))
        .collect();
    Ok(Trajectory::composite(route.clone(), ArcTimePath::new(vertices)?, base)?)
}
