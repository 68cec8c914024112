//! Unit tests for fl-spatial.

use fl_core::{ConvexPolygon, Point};

use crate::{Router, SpatialError, VisibilityRouter, World, WorldBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// One 2×2 block centred on (5, 0).
fn block_world() -> World {
    let mut b = WorldBuilder::new();
    b.add_obstacle(ConvexPolygon::square(p(5.0, 0.0), 1.0).unwrap());
    b.build()
}

// ── World ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod world {
    use super::*;

    #[test]
    fn covers_is_strict() {
        let w = block_world();
        assert!(w.covers(p(5.0, 0.0)));
        assert!(!w.covers(p(6.0, 0.0)));
        assert!(!w.covers(p(0.0, 0.0)));
    }

    #[test]
    fn line_of_sight() {
        let w = block_world();
        assert!(!w.line_of_sight(p(0.0, 0.0), p(10.0, 0.0)));
        assert!(w.line_of_sight(p(0.0, 2.0), p(10.0, 2.0)));
        // Running along the top edge is not a crossing.
        assert!(w.line_of_sight(p(0.0, 1.0), p(10.0, 1.0)));
    }

    #[test]
    fn perceived_world_is_buffered() {
        let w = block_world().perceived_by(0.5);
        assert_eq!(w.len(), 1);
        assert!(w.covers(p(6.4, 0.0)));
        assert!(!w.line_of_sight(p(0.0, 1.2), p(10.0, 1.2)));
    }

    #[test]
    fn empty_world() {
        let w = World::empty();
        assert!(w.is_empty());
        assert!(w.envelope().is_none());
        assert!(w.line_of_sight(p(0.0, 0.0), p(1.0, 1.0)));
    }

    #[test]
    fn obstacles_near_uses_index() {
        let w = block_world();
        let far = fl_core::Envelope::from_point(p(100.0, 100.0));
        assert_eq!(w.obstacles_near(far).count(), 0);
        let near = fl_core::Envelope::from_point(p(5.0, 0.5));
        assert_eq!(w.obstacles_near(near).count(), 1);
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use super::*;

    #[test]
    fn same_point_is_degenerate() {
        let r = VisibilityRouter::default().route(&World::empty(), p(1.0, 1.0), p(1.0, 1.0)).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.length(), 0.0);
    }

    #[test]
    fn clear_line_is_direct() {
        let r = VisibilityRouter::default().route(&World::empty(), p(0.0, 0.0), p(3.0, 4.0)).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.length(), 5.0);
    }

    #[test]
    fn routes_around_block() {
        let w = block_world();
        let r = VisibilityRouter::default().route(&w, p(0.0, 0.0), p(10.0, 0.0)).unwrap();
        assert_eq!(r.len(), 4);
        // Two corners of the block, each slightly inflated.
        let expected = 2.0 * (16.0f64 + 1.0).sqrt() + 2.0;
        assert!((r.length() - expected).abs() < 1e-3, "{}", r.length());
        for seg in r.segments() {
            assert!(w.line_of_sight(seg.from, seg.to));
        }
    }

    #[test]
    fn blocked_endpoint() {
        let w = block_world();
        let err = VisibilityRouter::default().route(&w, p(0.0, 0.0), p(5.0, 0.0)).unwrap_err();
        assert_eq!(err, SpatialError::Blocked(p(5.0, 0.0)));
    }

    #[test]
    fn enclosed_target_has_no_route() {
        // Four walls around (0, 0), overlapping at the corners.
        let walls = vec![
            ConvexPolygon::rectangle(p(-3.0, 2.0), p(3.0, 3.0)).unwrap(),
            ConvexPolygon::rectangle(p(-3.0, -3.0), p(3.0, -2.0)).unwrap(),
            ConvexPolygon::rectangle(p(-3.0, -3.0), p(-2.0, 3.0)).unwrap(),
            ConvexPolygon::rectangle(p(2.0, -3.0), p(3.0, 3.0)).unwrap(),
        ];
        let w = World::new(walls);
        let err = VisibilityRouter::default().route(&w, p(10.0, 0.0), p(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, SpatialError::NoRoute { .. }));
    }
}
