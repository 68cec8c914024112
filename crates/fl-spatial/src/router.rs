//! Routing trait and default visibility-graph implementation.
//!
//! # Pluggability
//!
//! The planners ask for routes through the [`Router`] trait, so applications
//! can swap in a navigation mesh, a road graph or a precomputed table without
//! touching the scheduler.  The default [`VisibilityRouter`] is exact for
//! convex obstacles and sufficient for moderate worlds.
//!
//! # Cost units
//!
//! Costs are Euclidean distances.  The route ignores moving obstacles and
//! speed limits; timing along the route is the arc-time planner's job.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use fl_core::{Point, Vector};
use fl_trajectory::SpatialPath;

use crate::{SpatialError, SpatialResult, World};

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-route engine over static obstacles.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so candidate evaluation can run on
/// Rayon worker threads.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to` avoiding the obstacles of `world`.
    ///
    /// `from == to` yields the degenerate two-point path rather than an
    /// error.  Returns [`SpatialError::NoRoute`] if the points are not
    /// connected.
    fn route(&self, world: &World, from: Point, to: Point) -> SpatialResult<SpatialPath>;
}

// ── VisibilityRouter ──────────────────────────────────────────────────────────

/// Dijkstra over the visibility graph of the obstacle corners.
///
/// Corners are pushed outward by `clearance` along their bisector so the
/// route does not run exactly along obstacle boundaries, where rounding
/// could later be read as touching the interior.
#[derive(Copy, Clone, Debug)]
pub struct VisibilityRouter {
    pub clearance: f64,
}

impl Default for VisibilityRouter {
    fn default() -> Self {
        Self { clearance: 1e-4 }
    }
}

impl Router for VisibilityRouter {
    fn route(&self, world: &World, from: Point, to: Point) -> SpatialResult<SpatialPath> {
        if from.approx_eq(to, fl_core::EPSILON) {
            return Ok(SpatialPath::degenerate(from));
        }
        for p in [from, to] {
            if world.covers(p) {
                return Err(SpatialError::Blocked(p));
            }
        }
        if world.line_of_sight(from, to) {
            return Ok(SpatialPath::line(from, to));
        }

        let mut vertices = vec![from, to];
        vertices.extend(
            world
                .obstacles()
                .iter()
                .flat_map(|o| inflated_corners(o.vertices(), self.clearance))
                .filter(|&c| !world.covers(c)),
        );
        trace!(vertices = vertices.len(), "visibility graph");

        let points = dijkstra(world, &vertices).ok_or(SpatialError::NoRoute { from, to })?;
        Ok(SpatialPath::new(points)?)
    }
}

/// Polygon corners moved `by` outward along the external bisector.
fn inflated_corners(ring: &[Point], by: f64) -> impl Iterator<Item = Point> + '_ {
    let n = ring.len();
    (0..n).map(move |i| {
        let (prev, cur, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
        let out = match ((cur - prev).normalized(), (cur - next).normalized()) {
            (Some(a), Some(b)) => (a + b).normalized().unwrap_or(Vector::ZERO),
            _ => Vector::ZERO,
        };
        cur + out * by
    })
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct HeapEntry {
    cost: f64,
    vertex: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    // Reversed so `BinaryHeap` (a max-heap) pops the cheapest entry; vertex
    // index breaks ties deterministically.
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `vertices[0]` to `vertices[1]`; edges are discovered
/// lazily by line-of-sight tests.
fn dijkstra(world: &World, vertices: &[Point]) -> Option<Vec<Point>> {
    let n = vertices.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![usize::MAX; n];
    let mut done = vec![false; n];

    dist[0] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, vertex: 0 });

    while let Some(HeapEntry { cost, vertex }) = heap.pop() {
        if vertex == 1 {
            return Some(reconstruct(vertices, &prev));
        }
        if done[vertex] {
            continue;
        }
        done[vertex] = true;

        let here = vertices[vertex];
        for next in 0..n {
            if done[next] || next == vertex {
                continue;
            }
            let new_cost = cost + here.distance(vertices[next]);
            if new_cost < dist[next] && world.line_of_sight(here, vertices[next]) {
                dist[next] = new_cost;
                prev[next] = vertex;
                heap.push(HeapEntry { cost: new_cost, vertex: next });
            }
        }
    }
    None
}

fn reconstruct(vertices: &[Point], prev: &[usize]) -> Vec<Point> {
    let mut points = vec![vertices[1]];
    let mut cur = 1;
    while prev[cur] != usize::MAX {
        cur = prev[cur];
        points.push(vertices[cur]);
    }
    points.reverse();
    points
}
