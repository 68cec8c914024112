//! Static obstacle world and builder.
//!
//! # Spatial index
//!
//! Every obstacle's bounding box goes into an R-tree (via `rstar`), keyed by
//! the obstacle's position in `obstacles`.  Point and segment queries first
//! ask the tree for candidate boxes and only then run the exact convex
//! polygon predicates, so a query touches the handful of obstacles nearby
//! rather than the whole world.
//!
//! # Perceived worlds
//!
//! Planning treats a node as its reference point.  [`World::perceived_by`]
//! grows every obstacle by the node's radius, so "the point stays outside
//! the perceived obstacles" is the same as "the footprint stays outside the
//! real ones".

use rstar::{RTree, RTreeObject, AABB};

use fl_core::{ConvexPolygon, Envelope, Point};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct ObstacleEntry {
    min: [f64; 2],
    max: [f64; 2],
    index: usize,
}

impl ObstacleEntry {
    fn new(index: usize, env: Envelope) -> Self {
        Self { min: [env.min.x, env.min.y], max: [env.max.x, env.max.y], index }
    }
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

fn aabb(env: Envelope) -> AABB<[f64; 2]> {
    AABB::from_corners([env.min.x, env.min.y], [env.max.x, env.max.y])
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Fixed convex obstacles plus an R-tree over their bounding boxes.
///
/// Do not construct directly; use [`WorldBuilder`] or [`World::new`].
#[derive(Clone, Debug)]
pub struct World {
    obstacles: Vec<ConvexPolygon>,
    index: RTree<ObstacleEntry>,
}

impl Default for World {
    fn default() -> Self {
        Self::empty()
    }
}

impl World {
    pub fn new(obstacles: Vec<ConvexPolygon>) -> Self {
        let entries = obstacles
            .iter()
            .enumerate()
            .map(|(i, o)| ObstacleEntry::new(i, o.envelope()))
            .collect();
        Self { obstacles, index: RTree::bulk_load(entries) }
    }

    /// A world without obstacles.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn obstacles(&self) -> &[ConvexPolygon] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// The world as seen by a node of `radius`: every obstacle buffered.
    pub fn perceived_by(&self, radius: f64) -> World {
        if radius <= 0.0 {
            return self.clone();
        }
        World::new(self.obstacles.iter().map(|o| o.buffered(radius)).collect())
    }

    /// Obstacles whose bounding box meets `env`.
    pub fn obstacles_near(&self, env: Envelope) -> impl Iterator<Item = &ConvexPolygon> + '_ {
        self.index
            .locate_in_envelope_intersecting(&aabb(env))
            .map(move |e| &self.obstacles[e.index])
    }

    /// `true` if `p` lies strictly inside some obstacle.  Standing on an
    /// obstacle's boundary is allowed.
    pub fn covers(&self, p: Point) -> bool {
        self.obstacles_near(Envelope::from_point(p)).any(|o| o.contains_strict(p))
    }

    /// `true` if the straight segment `a→b` never passes through an
    /// obstacle's interior.  Grazing a corner or running along an edge is
    /// line of sight.
    pub fn line_of_sight(&self, a: Point, b: Point) -> bool {
        if a.approx_eq(b, fl_core::EPSILON) {
            return !self.covers(a);
        }
        let env = Envelope::from_point(a).including(b);
        !self.obstacles_near(env).any(|o| o.segment_crosses_interior(a, b))
    }

    /// Bounding box of all obstacles, or `None` for an empty world.
    pub fn envelope(&self) -> Option<Envelope> {
        self.obstacles
            .iter()
            .map(ConvexPolygon::envelope)
            .reduce(Envelope::merged)
    }
}

// ── WorldBuilder ──────────────────────────────────────────────────────────────

/// Collect obstacles, then call [`build`](Self::build) to bulk-load the
/// R-tree once.
#[derive(Default)]
pub struct WorldBuilder {
    obstacles: Vec<ConvexPolygon>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_obstacle(&mut self, shape: ConvexPolygon) -> &mut Self {
        self.obstacles.push(shape);
        self
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Time complexity: O(N log N) for the R-tree bulk load.
    pub fn build(self) -> World {
        World::new(self.obstacles)
    }
}
