//! Edge legality in the arc-time plane.
//!
//! A mesh edge is legal if every checker in play accepts it.  Bounds and
//! speed are O(1); visibility walks the regions, so it goes last in an
//! [`AllOf`].

use fl_core::Point;
use fl_trajectory::ArcTime;

use crate::ForbiddenRegion;

/// Decides whether the straight arc-time edge `from → to` is legal.
pub trait EdgeChecker {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool;
}

impl<T: EdgeChecker + ?Sized> EdgeChecker for &T {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool {
        (**self).check(from, to)
    }
}

/// Accepts an edge only if all inner checkers do, in order.
pub struct AllOf<'a>(pub Vec<&'a dyn EdgeChecker>);

impl EdgeChecker for AllOf<'_> {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool {
        self.0.iter().all(|c| c.check(from, to))
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Both ends inside the planning box, and time strictly advancing.
#[derive(Copy, Clone, Debug)]
pub struct BoundsChecker {
    pub min_arc: f64,
    pub max_arc: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub tolerance: f64,
}

impl BoundsChecker {
    pub fn contains(&self, v: ArcTime) -> bool {
        v.arc >= self.min_arc - self.tolerance
            && v.arc <= self.max_arc + self.tolerance
            && v.time >= self.min_time - self.tolerance
            && v.time <= self.max_time + self.tolerance
    }
}

impl EdgeChecker for BoundsChecker {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool {
        to.time > from.time && self.contains(from) && self.contains(to)
    }
}

// ── Speed ─────────────────────────────────────────────────────────────────────

/// `|Δarc / Δtime|` within the speed limit.  Waiting is always legal.
#[derive(Copy, Clone, Debug)]
pub struct SpeedChecker {
    pub max_speed: f64,
    /// Relative slack for rounding in computed vertices.
    pub tolerance: f64,
}

impl EdgeChecker for SpeedChecker {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool {
        let (da, dt) = ((to.arc - from.arc).abs(), to.time - from.time);
        if da == 0.0 {
            return true;
        }
        dt > 0.0 && da <= self.max_speed * dt * (1.0 + self.tolerance)
    }
}

// ── Visibility ────────────────────────────────────────────────────────────────

/// The edge never runs through a region's interior.
#[derive(Copy, Clone, Debug)]
pub struct VisibilityChecker<'a> {
    pub regions: &'a [ForbiddenRegion],
}

impl VisibilityChecker<'_> {
    /// `true` if `v` is not inside any region.
    pub fn admits(&self, v: ArcTime) -> bool {
        let p = v.to_point();
        !self.regions.iter().any(|r| r.contains_strict(p))
    }

    pub fn visible(&self, a: Point, b: Point) -> bool {
        !self.regions.iter().any(|r| r.crosses(a, b))
    }
}

impl EdgeChecker for VisibilityChecker<'_> {
    fn check(&self, from: ArcTime, to: ArcTime) -> bool {
        self.visible(from.to_point(), to.to_point())
    }
}

// ── Buffer ────────────────────────────────────────────────────────────────────

/// The edge's end can be held for a further `duration` without entering a
/// region.  Required of every minimum-time finish.
#[derive(Copy, Clone, Debug)]
pub struct BufferChecker<'a> {
    pub visibility: VisibilityChecker<'a>,
    pub duration: f64,
}

impl BufferChecker<'_> {
    /// `true` if waiting at `v` for `duration` is collision-free.
    pub fn admits(&self, v: ArcTime) -> bool {
        if !self.visibility.admits(v) {
            return false;
        }
        self.duration <= 0.0
            || self.visibility.check(v, ArcTime::new(v.arc, v.time + self.duration))
    }
}

impl EdgeChecker for BufferChecker<'_> {
    fn check(&self, _from: ArcTime, to: ArcTime) -> bool {
        self.admits(to)
    }
}
