//! Unit tests for fl-arctime.

use fl_core::{ConvexPolygon, Point, Time};
use fl_trajectory::{ArcTime, ArcTimePath, DynamicObstacle, SpatialPath, Trajectory};

use crate::{
    build_forbidden_regions, find_fixed_time, find_minimum_time, ArcTimeError, EdgeChecker, FixedTimeQuery,
    ForbiddenRegion, MeshSettings, MinimumTimeQuery, SpeedChecker, VisibilityChecker,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn unit_square() -> ConvexPolygon {
    ConvexPolygon::square(Point::ORIGIN, 1.0).unwrap()
}

/// Straight route from (0, 0) to (10, 0).
fn route() -> SpatialPath {
    SpatialPath::line(p(0.0, 0.0), p(10.0, 0.0))
}

/// A 2×2 box moving along `x` from `y = -10` to `y = 10` over `[t0, t0 + 20]`.
fn crossing(x: f64, t0: f64) -> DynamicObstacle {
    let traj = Trajectory::new(SpatialPath::line(p(x, -10.0), p(x, 10.0)), vec![Time(t0), Time(t0 + 20.0)]).unwrap();
    DynamicObstacle::new(unit_square(), traj)
}

fn fixed<'a>(route: &'a SpatialPath, obstacles: &'a [DynamicObstacle], speed: f64, t0: f64, t1: f64) -> FixedTimeQuery<'a> {
    FixedTimeQuery {
        route,
        obstacles,
        max_speed: speed,
        start_time: Time(t0),
        finish_time: Time(t1),
        settings: MeshSettings::default(),
    }
}

fn minimum<'a>(
    route: &'a SpatialPath,
    obstacles: &'a [DynamicObstacle],
    speed: f64,
    earliest: f64,
    latest: f64,
    buffer: f64,
) -> MinimumTimeQuery<'a> {
    MinimumTimeQuery {
        route,
        obstacles,
        max_speed: speed,
        start_time: Time(0.0),
        earliest_finish_time: Time(earliest),
        latest_finish_time: Time(latest),
        buffer_duration: buffer,
        settings: MeshSettings::default(),
    }
}

/// Arc-time profile of a trajectory along [`route`] that starts at time 0.
fn profile_of(t: &Trajectory) -> ArcTimePath {
    ArcTimePath::new(t.vertices().map(|(q, at)| ArcTime::new(q.x, at.secs())).collect()).unwrap()
}

fn profile_edges(t: &Trajectory) -> Vec<(ArcTime, ArcTime)> {
    profile_of(t).vertices().windows(2).map(|w| (w[0], w[1])).collect()
}

fn assert_collision_free(t: &Trajectory, regions: &[ForbiddenRegion], speed: f64) {
    let vis = VisibilityChecker { regions };
    let sc = SpeedChecker { max_speed: speed, tolerance: 1e-6 };
    for (a, b) in profile_edges(t) {
        assert!(vis.check(a, b), "edge {a:?} -> {b:?} crosses a region");
        assert!(sc.check(a, b), "edge {a:?} -> {b:?} is too fast");
    }
}

// ── Forbidden regions ─────────────────────────────────────────────────────────

#[cfg(test)]
mod region {
    use super::*;

    #[test]
    fn crossing_obstacle_maps_to_box() {
        let regions = build_forbidden_regions(&route(), &[crossing(5.0, 0.0)], Time(0.0), 0.0);
        assert_eq!(regions.len(), 1);
        let env = regions[0].envelope();
        assert!(env.min.approx_eq(p(4.0, 9.0), 1e-9), "{:?}", env);
        assert!(env.max.approx_eq(p(6.0, 11.0), 1e-9), "{:?}", env);
        assert!(regions[0].contains_strict(p(5.0, 10.0)));
        assert!(!regions[0].contains_strict(p(3.0, 10.0)));
        assert_eq!(regions[0].obstacle, 0);
    }

    #[test]
    fn base_time_shifts_region() {
        let regions = build_forbidden_regions(&route(), &[crossing(5.0, 100.0)], Time(90.0), 0.0);
        assert!(regions[0].contains_strict(p(5.0, 20.0)));
    }

    #[test]
    fn head_on_obstacle_is_a_band() {
        // Moving against the route at unit speed: parallel, singular basis.
        let traj = Trajectory::new(SpatialPath::line(p(20.0, 0.0), p(0.0, 0.0)), vec![Time(0.0), Time(20.0)]).unwrap();
        let regions = build_forbidden_regions(&route(), &[DynamicObstacle::new(unit_square(), traj)], Time(0.0), 0.0);
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        // Collision whenever 19 < arc + time < 21.
        assert!(r.contains_strict(p(5.0, 15.0)));
        assert!(r.contains_strict(p(9.5, 10.5)));
        assert!(!r.contains_strict(p(5.0, 10.0)));
        assert!(!r.contains_strict(p(5.0, 17.0)));
    }

    #[test]
    fn parked_obstacle_blocks_its_arc_range() {
        let traj = Trajectory::stationary(p(5.0, 0.0), Time(0.0), Time(100.0)).unwrap();
        let regions = build_forbidden_regions(&route(), &[DynamicObstacle::new(unit_square(), traj)], Time(0.0), 0.0);
        let r = &regions[0];
        assert!(r.contains_strict(p(5.0, 50.0)));
        assert!(!r.contains_strict(p(3.0, 50.0)));
        assert!(r.crosses(p(0.0, 10.0), p(10.0, 20.0)));
    }

    #[test]
    fn distant_obstacle_has_no_region() {
        let regions = build_forbidden_regions(&route(), &[crossing(50.0, 0.0)], Time(0.0), 0.0);
        assert!(regions.is_empty());
    }

    #[test]
    fn zero_length_route_keeps_point_buffer() {
        let here = SpatialPath::degenerate(p(0.0, 0.0));
        let regions = build_forbidden_regions(&here, &[crossing(0.0, 0.0)], Time(0.0), 1e-6);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].crosses(p(0.0, 0.0), p(0.0, 20.0)));
        assert!(!regions[0].crosses(p(0.0, 0.0), p(0.0, 8.0)));
    }

    #[test]
    fn boundary_contact_is_not_a_crossing() {
        let regions = build_forbidden_regions(&route(), &[crossing(5.0, 0.0)], Time(0.0), 0.0);
        let r = &regions[0];
        // Waiting along the left edge, and passing through a corner.
        assert!(!r.crosses(p(4.0, 8.0), p(4.0, 12.0)));
        assert!(!r.crosses(p(0.0, 0.0), p(4.0, 11.0)));
        assert!(r.crosses(p(0.0, 0.0), p(10.0, 20.0)));
    }

    #[test]
    fn route_end_buffer_covers_the_end_arc() {
        // Parked on the route end: waiting there must cross the region.
        let traj = Trajectory::stationary(p(10.5, 0.0), Time(0.0), Time(100.0)).unwrap();
        let regions = build_forbidden_regions(&route(), &[DynamicObstacle::new(unit_square(), traj)], Time(0.0), 1e-6);
        assert!(regions[0].crosses(p(10.0, 0.0), p(10.0, 10.0)));
    }
}

// ── Checkers ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod checker {
    use super::*;
    use crate::{AllOf, BoundsChecker, BufferChecker};

    #[test]
    fn speed_allows_waiting() {
        let sc = SpeedChecker { max_speed: 1.0, tolerance: 0.0 };
        assert!(sc.check(ArcTime::new(3.0, 0.0), ArcTime::new(3.0, 10.0)));
        assert!(sc.check(ArcTime::new(0.0, 0.0), ArcTime::new(2.0, 2.0)));
        assert!(!sc.check(ArcTime::new(0.0, 0.0), ArcTime::new(2.1, 2.0)));
        // Reversing along the route at legal speed is fine too.
        assert!(sc.check(ArcTime::new(2.0, 0.0), ArcTime::new(1.0, 1.0)));
    }

    #[test]
    fn bounds_require_causality() {
        let b = BoundsChecker { min_arc: 0.0, max_arc: 10.0, min_time: 0.0, max_time: 10.0, tolerance: 0.0 };
        assert!(b.check(ArcTime::new(0.0, 0.0), ArcTime::new(5.0, 5.0)));
        assert!(!b.check(ArcTime::new(0.0, 5.0), ArcTime::new(5.0, 5.0)));
        assert!(!b.check(ArcTime::new(0.0, 0.0), ArcTime::new(11.0, 5.0)));
    }

    #[test]
    fn buffer_checks_the_wait_after_arrival() {
        let regions = build_forbidden_regions(&route(), &[crossing(5.0, 0.0)], Time(0.0), 0.0);
        let vis = VisibilityChecker { regions: &regions };
        let buf = BufferChecker { visibility: vis, duration: 3.0 };
        assert!(buf.admits(ArcTime::new(5.0, 5.0)));
        assert!(!buf.admits(ArcTime::new(5.0, 7.0)));
        assert!(buf.admits(ArcTime::new(5.0, 11.0)));
    }

    #[test]
    fn all_of_combines() {
        let sc = SpeedChecker { max_speed: 1.0, tolerance: 0.0 };
        let b = BoundsChecker { min_arc: 0.0, max_arc: 1.0, min_time: 0.0, max_time: 10.0, tolerance: 0.0 };
        let checks: Vec<&dyn EdgeChecker> = vec![&b, &sc];
        let all = AllOf(checks);
        assert!(all.check(ArcTime::new(0.0, 0.0), ArcTime::new(1.0, 1.0)));
        assert!(!all.check(ArcTime::new(0.0, 0.0), ArcTime::new(1.0, 0.5)));
        assert!(!all.check(ArcTime::new(0.0, 0.0), ArcTime::new(2.0, 5.0)));
    }
}

// ── Mesh and search ───────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use crate::{reachable_from, reverse_reachable, shortest_path, MeshBuilder, VertexId};
    use fl_trajectory::ArcTime;

    #[test]
    fn csr_layout() {
        let mut b = MeshBuilder::new();
        let a = b.add_vertex(ArcTime::new(0.0, 0.0));
        let c = b.add_vertex(ArcTime::new(1.0, 2.0));
        b.add_edge(c, a);
        b.add_edge(a, c);
        b.add_edge(a, c);
        let mesh = b.build();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.edge_count(), 2);
        assert_eq!(mesh.out_edges(a).len(), 1);
        assert_eq!(mesh.edge_weight[mesh.out_edges(a).start], 2.0);
    }

    #[test]
    fn ties_prefer_fewer_hops() {
        let mut b = MeshBuilder::new();
        let s = b.add_vertex(ArcTime::new(0.0, 0.0));
        let m = b.add_vertex(ArcTime::new(0.0, 1.0));
        let t = b.add_vertex(ArcTime::new(0.0, 2.0));
        b.add_edge(s, m);
        b.add_edge(m, t);
        b.add_edge(s, t);
        let mesh = b.build();
        assert_eq!(shortest_path(&mesh, s, t), Some(vec![s, t]));
    }

    #[test]
    fn unreachable_target() {
        let mut b = MeshBuilder::new();
        let s = b.add_vertex(ArcTime::new(0.0, 0.0));
        let t = b.add_vertex(ArcTime::new(0.0, 2.0));
        b.add_edge(t, s);
        let mesh = b.build();
        assert_eq!(shortest_path(&mesh, s, t), None);
        assert_eq!(shortest_path(&mesh, s, VertexId(9)), None);
    }

    #[test]
    fn forward_and_reverse_reachability() {
        let mut b = MeshBuilder::new();
        let v: Vec<VertexId> = (0..4).map(|i| b.add_vertex(ArcTime::new(0.0, i as f64))).collect();
        b.add_edge(v[0], v[1]);
        b.add_edge(v[1], v[2]);
        b.add_edge(v[3], v[2]);
        let mesh = b.build();
        assert_eq!(reachable_from(&mesh, v[0]), vec![true, true, true, false]);
        assert_eq!(reverse_reachable(&mesh, v[2]), vec![true, true, true, true]);
        assert_eq!(reverse_reachable(&mesh, v[1]), vec![true, true, false, false]);
    }
}

// ── Pathfinders ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod pathfinder {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fixed_time_in_empty_world() {
        let r = route();
        let t = find_fixed_time(&fixed(&r, &[], 2.0, 0.0, 10.0)).unwrap();
        assert_eq!(t.start_time(), Some(Time(0.0)));
        assert_eq!(t.finish_time(), Some(Time(10.0)));
        assert!(t.start_location().unwrap().approx_eq(p(0.0, 0.0), 1e-9));
        assert!(t.finish_location().unwrap().approx_eq(p(10.0, 0.0), 1e-9));
        assert!(profile_of(&t).max_speed() <= 2.0 + 1e-9);
    }

    #[test]
    fn fixed_time_too_short_is_infeasible() {
        let r = route();
        assert_eq!(find_fixed_time(&fixed(&r, &[], 1.0, 0.0, 5.0)), Err(ArcTimeError::Infeasible));
    }

    #[test]
    fn fixed_time_rejects_reversed_window() {
        let r = route();
        let err = find_fixed_time(&fixed(&r, &[], 1.0, 5.0, 0.0)).unwrap_err();
        assert!(matches!(err, ArcTimeError::InvalidQuery(_)));
    }

    #[test]
    fn fixed_time_zero_window_on_zero_route() {
        let here = SpatialPath::degenerate(p(1.0, 1.0));
        let t = find_fixed_time(&fixed(&here, &[], 1.0, 5.0, 5.0)).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.start_time(), Some(Time(5.0)));
        assert_eq!(t.finish_time(), Some(Time(5.0)));
        assert!(t.is_stationary_at(p(1.0, 1.0), 1e-12));
        assert_eq!(t.location_at(Time(5.0)), Some(p(1.0, 1.0)));
    }

    #[test]
    fn fixed_time_avoids_crossing_obstacle() {
        let r = route();
        let obstacles = [crossing(5.0, 0.0)];
        let t = find_fixed_time(&fixed(&r, &obstacles, 0.5, 0.0, 30.0)).unwrap();
        assert_eq!(t.finish_time(), Some(Time(30.0)));
        let regions = build_forbidden_regions(&r, &obstacles, Time(0.0), 1e-6);
        assert_collision_free(&t, &regions, 0.5);
    }

    #[test]
    fn parked_obstacle_on_route_blocks_everything() {
        let r = route();
        let traj = Trajectory::stationary(p(5.0, 0.0), Time(0.0), Time(100.0)).unwrap();
        let obstacles = [DynamicObstacle::new(unit_square(), traj)];
        assert_eq!(find_fixed_time(&fixed(&r, &obstacles, 1.0, 0.0, 50.0)), Err(ArcTimeError::Infeasible));
        assert_eq!(find_minimum_time(&minimum(&r, &obstacles, 1.0, 0.0, 50.0, 0.0)), Err(ArcTimeError::Infeasible));
    }

    #[test]
    fn waiting_in_place_under_a_passing_obstacle() {
        let here = SpatialPath::degenerate(p(0.0, 0.0));
        let obstacles = [crossing(0.0, 0.0)];
        assert_eq!(find_fixed_time(&fixed(&here, &obstacles, 1.0, 0.0, 20.0)), Err(ArcTimeError::Infeasible));
        let t = find_fixed_time(&fixed(&here, &obstacles, 1.0, 0.0, 5.0)).unwrap();
        assert!(t.is_stationary_at(p(0.0, 0.0), 1e-9));
        assert_eq!(t.finish_time(), Some(Time(5.0)));
    }

    #[test]
    fn minimum_time_in_empty_world() {
        let r = route();
        let t = find_minimum_time(&minimum(&r, &[], 2.0, 0.0, 100.0, 5.0)).unwrap();
        assert!(t.finish_time().unwrap().approx_eq(Time(5.0), 1e-9));
        assert!(t.finish_location().unwrap().approx_eq(p(10.0, 0.0), 1e-9));
    }

    #[test]
    fn minimum_time_respects_earliest_finish() {
        let r = route();
        let t = find_minimum_time(&minimum(&r, &[], 2.0, 8.0, 100.0, 0.0)).unwrap();
        assert!(t.finish_time().unwrap().approx_eq(Time(8.0), 1e-9));
    }

    #[test]
    fn minimum_time_window_too_tight() {
        let r = route();
        assert_eq!(find_minimum_time(&minimum(&r, &[], 1.0, 0.0, 5.0, 0.0)), Err(ArcTimeError::Infeasible));
    }

    #[test]
    fn minimum_time_waits_for_obstacle() {
        // At speed 0.5 the straight run meets the obstacle; the best plan
        // waits at arc 4 until it has passed (t = 11), arriving at 23.
        let r = route();
        let obstacles = [crossing(5.0, 0.0)];
        let t = find_minimum_time(&minimum(&r, &obstacles, 0.5, 0.0, 100.0, 0.0)).unwrap();
        assert!(t.finish_time().unwrap().approx_eq(Time(23.0), 1e-6), "{:?}", t.finish_time());
        let regions = build_forbidden_regions(&r, &obstacles, Time(0.0), 1e-6);
        assert_collision_free(&t, &regions, 0.5);
    }

    #[test]
    fn minimum_time_buffer_defers_arrival() {
        // The obstacle covers arcs (9, 10] during (9, 11).  Arriving at 5
        // with a 5 s buffer would overlap it, so the node holds at arc 9
        // until 11 and covers the last unit at full speed.
        let r = route();
        let obstacles = [crossing(10.0, 0.0)];
        let t = find_minimum_time(&minimum(&r, &obstacles, 2.0, 0.0, 100.0, 5.0)).unwrap();
        assert!(t.finish_time().unwrap().approx_eq(Time(11.5), 1e-6), "{:?}", t.finish_time());
    }

    #[test]
    fn minimum_time_zero_route_already_there() {
        let here = SpatialPath::degenerate(p(0.0, 0.0));
        let t = find_minimum_time(&minimum(&here, &[], 1.0, 0.0, 10.0, 1.0)).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.start_time(), Some(Time(0.0)));
        assert_eq!(t.finish_time(), Some(Time(0.0)));
        assert!(t.is_stationary_at(p(0.0, 0.0), 1e-12));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Whatever the pathfinder returns is collision-free and within the
        /// speed limit.
        #[test]
        fn prop_fixed_time_profiles_avoid_regions(
            x in 2.0f64..8.0,
            t0 in 0.0f64..15.0,
            horizon in 25.0f64..60.0,
        ) {
            let r = route();
            let obstacles = [crossing(x, t0)];
            if let Ok(t) = find_fixed_time(&fixed(&r, &obstacles, 1.0, 0.0, horizon)) {
                let profile = profile_of(&t);
                prop_assert!(profile.max_speed() <= 1.0 + 1e-6);
                prop_assert!(profile.vertices().windows(2).all(|w| w[0].time < w[1].time));
                let clipped: Vec<DynamicObstacle> = obstacles
                    .iter()
                    .map(|o| DynamicObstacle::new(o.shape.clone(), o.trajectory.sub_trajectory(Time(0.0), Time(horizon))))
                    .collect();
                let regions = build_forbidden_regions(&r, &clipped, Time(0.0), 1e-6);
                let vis = VisibilityChecker { regions: &regions };
                for w in profile.vertices().windows(2) {
                    prop_assert!(vis.check(w[0], w[1]));
                }
                prop_assert!(t.finish_location().unwrap().approx_eq(p(10.0, 0.0), 1e-6));
            }
        }
    }
}
