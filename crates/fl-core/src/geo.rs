//! Planar geometry: points, vectors, envelopes and convex polygons.
//!
//! Everything the scheduler needs from geometry reduces to convex pieces:
//! node footprints, static obstacles, location spaces and the per-segment
//! pieces of a forbidden region are all convex, so a small, exact-enough
//! toolkit on `f64` replaces a general polygon library.
//!
//! Tolerances are absolute and expressed in world units ([`EPSILON`]).

use std::f64::consts::PI;

use crate::{CoreError, CoreResult};

/// Absolute geometric tolerance.
pub const EPSILON: f64 = 1e-9;

// ── Point / Vector ────────────────────────────────────────────────────────────

/// A location in the plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A displacement in the plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other - self).norm()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// `true` if the two points are within `tolerance` of each other.
    #[inline]
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }

    /// Linear interpolation; `alpha = 0` yields `self`, `alpha = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Point, alpha: f64) -> Point {
        self + (other - self) * alpha
    }

    #[inline]
    pub fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, o: Vector) -> f64 {
        self.x * o.x + self.y * o.y
    }

    /// z-component of the 3-D cross product.
    #[inline]
    pub fn cross(self, o: Vector) -> f64 {
        self.x * o.y - self.y * o.x
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    #[inline]
    pub fn normalized(self) -> Option<Vector> {
        let n = self.norm();
        (n > EPSILON).then(|| self * (1.0 / n))
    }

    /// Counter-clockwise perpendicular.
    #[inline]
    pub fn perp(self) -> Vector {
        Vector::new(-self.y, self.x)
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add<Vector> for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub<Vector> for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;
    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vector {
    type Output = Vector;
    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vector {
    type Output = Vector;
    #[inline]
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub min: Point,
    pub max: Point,
}

impl Envelope {
    pub fn from_point(p: Point) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest envelope containing every point; `None` for an empty input.
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Envelope::from_point(first), |env, p| env.including(p)))
    }

    #[must_use]
    pub fn including(self, p: Point) -> Self {
        Self {
            min: Point::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    #[must_use]
    pub fn merged(self, o: Envelope) -> Self {
        self.including(o.min).including(o.max)
    }

    #[must_use]
    pub fn expanded(self, by: f64) -> Self {
        Self {
            min: Point::new(self.min.x - by, self.min.y - by),
            max: Point::new(self.max.x + by, self.max.y + by),
        }
    }

    #[inline]
    pub fn intersects(&self, o: &Envelope) -> bool {
        self.min.x <= o.max.x && o.min.x <= self.max.x && self.min.y <= o.max.y && o.min.y <= self.max.y
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

// ── ConvexPolygon ─────────────────────────────────────────────────────────────

/// A convex polygon with counter-clockwise vertices and non-zero area.
///
/// The ring is stored open (the first vertex is not repeated).  All
/// constructors go through [`ConvexPolygon::hull`], so the invariants hold
/// for every value of this type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexPolygon {
    vertices: Vec<Point>,
}

impl ConvexPolygon {
    /// Convex hull of `points` (Andrew's monotone chain).
    ///
    /// Returns `None` when the points are fewer than three or collinear,
    /// i.e. when the hull has no area.  Geometric operations use this as
    /// their "empty result" outcome.
    pub fn hull<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut pts: Vec<Point> = points.into_iter().filter(|p| p.is_finite()).collect();
        if pts.len() < 3 {
            return None;
        }
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts.dedup_by(|a, b| a.approx_eq(*b, EPSILON));
        if pts.len() < 3 {
            return None;
        }

        let turn = |o: Point, a: Point, b: Point| (a - o).cross(b - o);
        let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
        for &p in &pts {
            while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPSILON * EPSILON {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for &p in pts.iter().rev().skip(1) {
            while hull.len() >= lower_len && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= EPSILON * EPSILON {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();

        let polygon = Self { vertices: hull };
        (polygon.vertices.len() >= 3 && polygon.area() > EPSILON * EPSILON).then_some(polygon)
    }

    /// Validating constructor for caller-supplied vertices.
    ///
    /// The vertices are hulled, so their order does not matter, but they must
    /// be finite and span a non-zero area.
    pub fn new(vertices: Vec<Point>) -> CoreResult<Self> {
        if vertices.iter().any(|p| !p.is_finite()) {
            return Err(CoreError::Geometry("polygon vertex is not finite".into()));
        }
        Self::hull(vertices).ok_or_else(|| CoreError::Geometry("polygon has no area".into()))
    }

    /// Axis-aligned rectangle.
    pub fn rectangle(min: Point, max: Point) -> CoreResult<Self> {
        Self::new(vec![min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)])
    }

    /// Square of half-width `half` centred on `center`.
    pub fn square(center: Point, half: f64) -> CoreResult<Self> {
        Self::rectangle(
            Point::new(center.x - half, center.y - half),
            Point::new(center.x + half, center.y + half),
        )
    }

    /// Regular `n`-gon circumscribing the circle of `radius` around `center`.
    pub fn circumscribing_circle(center: Point, radius: f64, n: usize) -> CoreResult<Self> {
        if n < 3 || radius <= 0.0 || !radius.is_finite() {
            return Err(CoreError::Geometry(format!("invalid circle approximation: n={n}, r={radius}")));
        }
        let r = radius / (PI / n as f64).cos();
        Self::new(
            (0..n)
                .map(|i| {
                    let a = 2.0 * PI * i as f64 / n as f64;
                    center + Vector::new(a.cos(), a.sin()) * r
                })
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Iterator over the directed edges `(v[i], v[i+1])`, closing the ring.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn envelope(&self) -> Envelope {
        // Non-empty by construction.
        Envelope::from_points(self.vertices.iter().copied()).unwrap_or(Envelope::from_point(Point::ORIGIN))
    }

    pub fn area(&self) -> f64 {
        0.5 * self
            .edges()
            .map(|(a, b)| a.to_vector().cross(b.to_vector()))
            .sum::<f64>()
    }

    pub fn centroid(&self) -> Point {
        let n = self.vertices.len() as f64;
        let (sx, sy) = self.vertices.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Largest distance of any vertex from `center`, i.e. the radius of the
    /// smallest circle around `center` covering the polygon.
    pub fn radius_about(&self, center: Point) -> f64 {
        self.vertices.iter().map(|v| v.distance(center)).fold(0.0, f64::max)
    }

    /// Signed distance of `p` from the edge line `a→b`, positive inside.
    #[inline]
    fn edge_side(a: Point, b: Point, p: Point) -> f64 {
        let e = b - a;
        e.cross(p - a) / e.norm()
    }

    /// Point-in-polygon including the boundary (within [`EPSILON`]).
    pub fn contains(&self, p: Point) -> bool {
        self.edges().all(|(a, b)| Self::edge_side(a, b, p) >= -EPSILON)
    }

    /// Point strictly inside the polygon (farther than [`EPSILON`] from the
    /// boundary).
    pub fn contains_strict(&self, p: Point) -> bool {
        self.edges().all(|(a, b)| Self::edge_side(a, b, p) > EPSILON)
    }

    #[must_use]
    pub fn translated(&self, v: Vector) -> Self {
        Self { vertices: self.vertices.iter().map(|&p| p + v).collect() }
    }

    /// Image under an arbitrary point map.  Affine maps keep convexity; the
    /// result is re-hulled so orientation flips are harmless.
    pub fn mapped<F: Fn(Point) -> Point>(&self, f: F) -> Option<Self> {
        Self::hull(self.vertices.iter().map(|&p| f(p)))
    }

    /// Minkowski sum with a disc of `radius`, approximated from outside by
    /// a circumscribing octagon.
    pub fn buffered(&self, radius: f64) -> Self {
        if radius <= 0.0 {
            return self.clone();
        }
        const SIDES: usize = 8;
        let r = radius / (PI / SIDES as f64).cos();
        let offsets: Vec<Vector> = (0..SIDES)
            .map(|i| {
                let a = 2.0 * PI * (i as f64 + 0.5) / SIDES as f64;
                Vector::new(a.cos(), a.sin()) * r
            })
            .collect();
        let grown = Self::hull(self.vertices.iter().flat_map(|&p| offsets.iter().map(move |&o| p + o)));
        grown.unwrap_or_else(|| self.clone())
    }

    /// Intersection with the half-plane `{ p : n·p <= c }`
    /// (Sutherland–Hodgman against a single plane).
    pub fn clip_half_plane(&self, n: Vector, c: f64) -> Option<Self> {
        let inside = |p: Point| n.dot(p.to_vector()) <= c + EPSILON;
        let mut out = Vec::with_capacity(self.vertices.len() + 2);
        for (a, b) in self.edges() {
            let (ia, ib) = (inside(a), inside(b));
            if ia {
                out.push(a);
            }
            if ia != ib {
                let da = n.dot(a.to_vector()) - c;
                let db = n.dot(b.to_vector()) - c;
                let denom = da - db;
                if denom.abs() > f64::MIN_POSITIVE {
                    out.push(a.lerp(b, da / denom));
                }
            }
        }
        Self::hull(out)
    }

    /// Intersection with an axis-aligned box.
    pub fn clip_envelope(&self, env: &Envelope) -> Option<Self> {
        self.clip_half_plane(Vector::new(1.0, 0.0), env.max.x)?
            .clip_half_plane(Vector::new(-1.0, 0.0), -env.min.x)?
            .clip_half_plane(Vector::new(0.0, 1.0), env.max.y)?
            .clip_half_plane(Vector::new(0.0, -1.0), -env.min.y)
    }

    /// Parameter interval `[t0, t1] ⊆ [lo, hi]` of `origin + t·dir` lying in
    /// the closed polygon (Cyrus–Beck).  `None` if the line misses it.
    pub fn clip_line(&self, origin: Point, dir: Vector, lo: f64, hi: f64) -> Option<(f64, f64)> {
        let (mut t0, mut t1) = (lo, hi);
        for (a, b) in self.edges() {
            let e = b - a;
            let len = e.norm();
            let num = e.cross(origin - a) / len + EPSILON;
            let den = e.cross(dir) / len;
            if den.abs() < 1e-15 {
                if num < 0.0 {
                    return None;
                }
                continue;
            }
            let t = -num / den;
            if den > 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }

    /// Parameter interval of the segment `a→b` (`t ∈ [0, 1]`) lying in the
    /// closed polygon.
    pub fn clip_segment(&self, a: Point, b: Point) -> Option<(f64, f64)> {
        self.clip_line(a, b - a, 0.0, 1.0)
    }

    /// `true` if some sub-segment of positive length of `a→b` passes through
    /// the interior.  Touching a vertex or running along an edge does not
    /// count.
    pub fn segment_crosses_interior(&self, a: Point, b: Point) -> bool {
        match self.clip_segment(a, b) {
            Some((t0, t1)) if (t1 - t0) * a.distance(b) > EPSILON => {
                self.contains_strict(a.lerp(b, 0.5 * (t0 + t1)))
            }
            _ => false,
        }
    }
}
