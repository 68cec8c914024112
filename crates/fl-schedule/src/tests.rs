//! Unit tests for fl-schedule.

#[cfg(test)]
mod fixtures {
    use fl_core::{ConvexPolygon, JobId, NodeId, PlannerConfig, Point, Time};
    use fl_node::{Job, NodeSpecification};
    use fl_spatial::World;
    use fl_trajectory::{SpatialPath, Trajectory};

    use crate::{Alternative, Schedule};

    pub const ROOT: crate::BranchId = Alternative::ROOT;

    pub fn spec(id: u32, x: f64, y: f64) -> NodeSpecification {
        NodeSpecification {
            id: NodeId(id),
            shape: ConvexPolygon::square(Point::default(), 0.5).unwrap(),
            max_speed: 1.0,
            initial_location: Point::new(x, y),
            initial_time: Time(0.0),
        }
    }

    /// Node 1 parked at the origin, node 2 at (10, 10), both from t=0.
    pub fn schedule() -> Schedule {
        let mut s = Schedule::new(World::empty(), &PlannerConfig::default());
        s.add_node(spec(1, 0.0, 0.0)).unwrap();
        s.add_node(spec(2, 10.0, 10.0)).unwrap();
        s
    }

    pub fn stay(x: f64, y: f64, from: f64, to: f64) -> Trajectory {
        Trajectory::stationary(Point::new(x, y), Time(from), Time(to)).unwrap()
    }

    pub fn travel(a: (f64, f64), b: (f64, f64), from: f64, to: f64) -> Trajectory {
        let path = SpatialPath::line(Point::new(a.0, a.1), Point::new(b.0, b.1));
        Trajectory::new(path, vec![Time(from), Time(to)]).unwrap()
    }

    pub fn job(id: u64, node: u32, x: f64, y: f64, start: f64, duration: f64) -> Job {
        Job::new(JobId(id), NodeId(node), Point::new(x, y), Time(start), duration).unwrap()
    }

    /// Node 1 drives to (4, 0) over [0, 4] and waits there for job `id`
    /// at [10, 12).
    pub fn insertion(id: u64) -> Alternative {
        let mut alt = Alternative::new();
        alt.stage_trajectory(ROOT, NodeId(1), travel((0.0, 0.0), (4.0, 0.0), 0.0, 4.0)).unwrap();
        alt.stage_trajectory(ROOT, NodeId(1), stay(4.0, 0.0, 4.0, 12.0)).unwrap();
        alt.add_job(ROOT, job(id, 1, 4.0, 0.0, 10.0, 2.0)).unwrap();
        alt
    }

    pub fn sealed(mut alt: Alternative) -> Alternative {
        alt.seal().unwrap();
        alt
    }
}

#[cfg(test)]
mod update {
    use fl_core::{IntervalSet, NodeId, Time, TimeBound};

    use super::fixtures::{job, schedule, stay, travel, ROOT};
    use crate::{Alternative, NodeUpdate, ScheduleError, Tolerance};

    #[test]
    fn overlapping_pieces_are_clipped() {
        let mut u = NodeUpdate::new(NodeId(1));
        u.stage_trajectory(stay(0.0, 0.0, 0.0, 10.0)).unwrap();
        u.stage_trajectory(stay(0.0, 0.0, 4.0, 6.0)).unwrap();
        let spans: Vec<(Time, Time)> = u
            .trajectories()
            .map(|t| (t.start_time().unwrap(), t.finish_time().unwrap()))
            .collect();
        assert_eq!(spans, vec![(Time(0.0), Time(4.0)), (Time(4.0), Time(6.0)), (Time(6.0), Time(10.0))]);

        u.stage_trajectory(stay(0.0, 0.0, -1.0, 12.0)).unwrap();
        assert_eq!(u.trajectories().count(), 1);
        assert_eq!(u.trajectories().next().unwrap().start_time(), Some(Time(-1.0)));
    }

    #[test]
    fn foreign_job_rejected() {
        let mut u = NodeUpdate::new(NodeId(1));
        assert!(u.add_job(job(1, 2, 0.0, 0.0, 1.0, 1.0)).is_err());
        assert!(u.is_empty());
    }

    #[test]
    fn touching_pieces_must_meet() {
        let s = schedule();
        let mut u = NodeUpdate::new(NodeId(1));
        u.stage_trajectory(travel((0.0, 0.0), (4.0, 0.0), 0.0, 4.0)).unwrap();
        u.stage_trajectory(stay(5.0, 0.0, 4.0, 8.0)).unwrap();
        let err = u.check_self_consistency(s.node(NodeId(1)).unwrap(), Tolerance::default()).unwrap_err();
        assert_eq!(err, ScheduleError::Discontinuous { node: NodeId(1), at: Time(4.0) });
    }

    #[test]
    fn job_checked_against_committed_trajectory() {
        let s = schedule();
        let node = s.node(NodeId(1)).unwrap();

        let mut u = NodeUpdate::new(NodeId(1));
        u.add_job(job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        u.check_self_consistency(node, Tolerance::default()).unwrap();

        let mut u = NodeUpdate::new(NodeId(1));
        u.add_job(job(1, 1, 3.0, 0.0, 1.0, 1.0)).unwrap();
        assert!(matches!(
            u.check_self_consistency(node, Tolerance::default()),
            Err(ScheduleError::Inconsistent { .. })
        ));
    }

    #[test]
    fn job_checked_against_staged_trajectory() {
        // Committed history parks the node at the origin, but the staged
        // piece moves it away during the job.
        let s = schedule();
        let mut u = NodeUpdate::new(NodeId(1));
        u.stage_trajectory(travel((0.0, 0.0), (4.0, 0.0), 0.0, 4.0)).unwrap();
        u.add_job(job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        assert!(matches!(
            u.check_self_consistency(s.node(NodeId(1)).unwrap(), Tolerance::default()),
            Err(ScheduleError::Inconsistent { .. })
        ));
    }

    #[test]
    fn staged_jobs_must_not_overlap() {
        let s = schedule();
        let mut alt = Alternative::new();
        alt.add_job(ROOT, job(1, 1, 0.0, 0.0, 1.0, 2.0)).unwrap();
        alt.add_job(ROOT, job(2, 1, 0.0, 0.0, 2.0, 2.0)).unwrap();
        let u = alt.update(ROOT, NodeId(1)).unwrap();
        assert!(u.check_self_consistency(s.node(NodeId(1)).unwrap(), Tolerance::default()).is_err());
    }

    #[test]
    fn lock_reaching_the_tail_runs_forever() {
        let mut u = NodeUpdate::new(NodeId(1));
        u.stage_trajectory(stay(0.0, 0.0, 0.0, 5.0)).unwrap();
        assert_eq!(
            u.trajectory_intervals(Time(10.0)),
            IntervalSet::of(TimeBound::At(Time(0.0)), TimeBound::At(Time(5.0)))
        );
        assert_eq!(
            u.trajectory_intervals(Time(5.0)),
            IntervalSet::of(TimeBound::At(Time(0.0)), TimeBound::PosInfinity)
        );
    }

    #[test]
    fn lock_covers_added_jobs() {
        let mut u = NodeUpdate::new(NodeId(1));
        u.add_job(job(1, 1, 0.0, 0.0, 20.0, 2.0)).unwrap();
        u.remove_job(job(2, 1, 0.0, 0.0, 30.0, 1.0)).unwrap();
        let locks = u.lock_intervals(Time(100.0));
        assert!(locks.contains(TimeBound::At(Time(21.0))));
        assert!(!locks.contains(TimeBound::At(Time(30.5))));
        assert_eq!(u.earliest_time(), Some(Time(20.0)));
    }

    #[test]
    fn splice_must_match_committed_location() {
        let s = schedule();
        let mut u = NodeUpdate::new(NodeId(1));
        u.stage_trajectory(stay(1.0, 0.0, 0.0, 2.0)).unwrap();
        let err = u.check_splices(s.node(NodeId(1)).unwrap(), Tolerance::default()).unwrap_err();
        assert_eq!(err, ScheduleError::Discontinuous { node: NodeId(1), at: Time(0.0) });
    }
}

#[cfg(test)]
mod alternative {
    use fl_core::{JobId, NodeId};

    use super::fixtures::{job, stay, ROOT};
    use crate::{Alternative, ScheduleError};

    #[test]
    fn branch_copies_and_locks_parent() {
        let mut alt = Alternative::new();
        alt.add_job(ROOT, job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        let child = alt.branch(ROOT).unwrap();
        assert!(alt.job(child, JobId(1)).is_some());

        assert_eq!(alt.add_job(ROOT, job(2, 1, 0.0, 0.0, 5.0, 1.0)), Err(ScheduleError::Branched(ROOT)));
        alt.add_job(child, job(2, 1, 0.0, 0.0, 5.0, 1.0)).unwrap();
        assert!(alt.job(ROOT, JobId(2)).is_none());

        alt.merge(child).unwrap();
        assert!(alt.job(ROOT, JobId(2)).is_some());
        assert!(alt.job(child, JobId(2)).is_none());
    }

    #[test]
    fn delete_discards_child() {
        let mut alt = Alternative::new();
        let child = alt.branch(ROOT).unwrap();
        alt.stage_trajectory(child, NodeId(1), stay(0.0, 0.0, 0.0, 1.0)).unwrap();
        alt.delete(child).unwrap();
        assert!(alt.is_empty());
        assert_eq!(alt.delete(child), Err(ScheduleError::UnknownBranch(child)));
        alt.add_job(ROOT, job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
    }

    #[test]
    fn merge_needs_sole_child() {
        let mut alt = Alternative::new();
        let a = alt.branch(ROOT).unwrap();
        let b = alt.branch(ROOT);
        assert_eq!(b, Err(ScheduleError::Branched(ROOT)));
        let grandchild = alt.branch(a).unwrap();
        assert_eq!(alt.merge(a), Err(ScheduleError::Branched(a)));
        alt.merge(grandchild).unwrap();
        alt.merge(a).unwrap();
        assert_eq!(alt.merge(ROOT), Err(ScheduleError::NotMergeable(ROOT)));
    }

    #[test]
    fn seal_needs_unbranched_root() {
        let mut alt = Alternative::new();
        let child = alt.branch(ROOT).unwrap();
        assert_eq!(alt.seal(), Err(ScheduleError::Branched(ROOT)));
        alt.delete(child).unwrap();
        alt.add_job(ROOT, job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        alt.seal().unwrap();
        assert!(alt.is_sealed());
        assert!(alt.updates().all(|u| u.is_sealed()));
        assert_eq!(alt.add_job(ROOT, job(2, 1, 0.0, 0.0, 5.0, 1.0)), Err(ScheduleError::Sealed));
        assert_eq!(alt.branch(ROOT), Err(ScheduleError::Sealed));
    }

    #[test]
    fn job_ids_unique_across_nodes() {
        let mut alt = Alternative::new();
        alt.add_job(ROOT, job(1, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(alt.add_job(ROOT, job(1, 2, 0.0, 0.0, 1.0, 1.0)), Err(ScheduleError::DuplicateJob(JobId(1))));
        assert_eq!(alt.node_ids(), vec![NodeId(1)]);
    }
}

#[cfg(test)]
mod schedule {
    use fl_core::{ConvexPolygon, JobId, NodeId, Point, Time, TimeBound};
    use fl_node::NodeState;
    use fl_trajectory::DynamicObstacle;

    use super::fixtures::{insertion, job, schedule, sealed, spec, stay, travel, ROOT};
    use crate::{Alternative, ScheduleError};

    #[test]
    fn duplicate_node_rejected() {
        let mut s = schedule();
        assert_eq!(s.add_node(spec(1, 0.0, 0.0)).unwrap_err(), ScheduleError::DuplicateNode(NodeId(1)));
    }

    #[test]
    fn unsealed_alternative_rejected() {
        let mut s = schedule();
        assert_eq!(s.add_alternative(insertion(7)), Err(ScheduleError::NotSealed));
    }

    #[test]
    fn accept_then_integrate() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        assert!(s.job(JobId(7)).is_none());
        assert!(!s.node(NodeId(1)).unwrap().trajectory_locks().is_empty());

        s.integrate(id).unwrap();
        let node = s.node(NodeId(1)).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.location), Some(Point::new(4.0, 0.0)));
        assert_eq!(node.location_at(Time(2.0)), Some(Point::new(2.0, 0.0)));
        assert_eq!(node.location_at(Time(50.0)), Some(Point::new(4.0, 0.0)));
        assert!(node.trajectory_locks().is_empty());
        assert_eq!(s.outstanding_count(), 0);
    }

    #[test]
    fn conflicting_alternative_rejected_until_first_resolves() {
        let mut s = schedule();
        let first = s.add_alternative(sealed(insertion(7))).unwrap();
        let err = s.add_alternative(sealed(insertion(8))).unwrap_err();
        assert!(matches!(err, ScheduleError::Conflict { .. }));

        s.eliminate(first).unwrap();
        assert!(s.node(NodeId(1)).unwrap().is_idle());
        s.add_alternative(sealed(insertion(8))).unwrap();
    }

    #[test]
    fn rejected_alternative_leaves_no_locks() {
        let mut s = schedule();
        let mut alt = insertion(7);
        // The second node's part is broken: it does not start where node 2 is.
        alt.stage_trajectory(ROOT, NodeId(2), stay(0.0, 0.0, 0.0, 1.0)).unwrap();
        assert!(s.add_alternative(sealed(alt)).is_err());
        assert!(s.node(NodeId(1)).unwrap().is_idle());
        assert!(s.node(NodeId(2)).unwrap().is_idle());
        s.add_alternative(sealed(insertion(7))).unwrap();
    }

    #[test]
    fn same_job_id_claimed_once() {
        let mut s = schedule();
        s.add_alternative(sealed(insertion(7))).unwrap();
        let mut other = Alternative::new();
        other.stage_trajectory(ROOT, NodeId(2), stay(10.0, 10.0, 0.0, 5.0)).unwrap();
        other.add_job(ROOT, job(7, 2, 10.0, 10.0, 1.0, 1.0)).unwrap();
        assert_eq!(s.add_alternative(sealed(other)), Err(ScheduleError::DuplicateJob(JobId(7))));
    }

    #[test]
    fn partial_integrate_and_eliminate() {
        let mut s = schedule();
        let mut alt = insertion(7);
        alt.stage_trajectory(ROOT, NodeId(2), stay(10.0, 10.0, 0.0, 5.0)).unwrap();
        alt.add_job(ROOT, job(9, 2, 10.0, 10.0, 1.0, 1.0)).unwrap();
        let id = s.add_alternative(sealed(alt)).unwrap();

        s.integrate_node(id, NodeId(1)).unwrap();
        assert!(s.job(JobId(7)).is_some());
        assert!(s.job(JobId(9)).is_none());
        assert_eq!(s.outstanding_count(), 1);
        assert_eq!(s.alternative(id).map(|a| a.node_ids()), Some(vec![NodeId(2)]));

        s.eliminate_node(id, NodeId(2)).unwrap();
        assert_eq!(s.outstanding_count(), 0);
        assert!(s.node(NodeId(2)).unwrap().is_idle());
        assert_eq!(s.integrate(id), Err(ScheduleError::UnknownAlternative(id)));
    }

    #[test]
    fn staged_removal_locks_the_job() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        s.integrate(id).unwrap();

        let committed = *s.job(JobId(7)).unwrap();
        let mut removal = Alternative::new();
        removal.remove_job(ROOT, committed).unwrap();
        removal.stage_trajectory(ROOT, NodeId(1), stay(4.0, 0.0, 10.0, 12.0)).unwrap();
        let id = s.add_alternative(sealed(removal)).unwrap();

        assert_eq!(s.remove_job(JobId(7)), Err(ScheduleError::RemovalLocked(JobId(7))));
        s.integrate(id).unwrap();
        assert!(s.job(JobId(7)).is_none());
        assert_eq!(s.remove_job(JobId(7)), Err(ScheduleError::UnknownJob(JobId(7))));
    }

    #[test]
    fn unknown_removal_rejected() {
        let mut s = schedule();
        let mut removal = Alternative::new();
        removal.remove_job(ROOT, job(3, 1, 0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(s.add_alternative(sealed(removal)), Err(ScheduleError::UnknownJob(JobId(3))));
    }

    #[test]
    fn rewriting_under_committed_job_rejected() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        s.integrate(id).unwrap();

        let mut alt = Alternative::new();
        alt.stage_trajectory(ROOT, NodeId(1), stay(4.0, 0.0, 9.0, 11.0)).unwrap();
        assert!(matches!(s.add_alternative(sealed(alt)), Err(ScheduleError::Conflict { .. })));
    }

    #[test]
    fn reschedule_reuses_the_id() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        s.integrate(id).unwrap();

        let committed = *s.job(JobId(7)).unwrap();
        let mut alt = Alternative::new();
        alt.remove_job(ROOT, committed).unwrap();
        alt.stage_trajectory(ROOT, NodeId(1), stay(4.0, 0.0, 10.0, 20.0)).unwrap();
        alt.add_job(ROOT, job(7, 1, 4.0, 0.0, 15.0, 3.0)).unwrap();
        let id = s.add_alternative(sealed(alt)).unwrap();
        s.integrate(id).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.start_time), Some(Time(15.0)));
        assert_eq!(s.job_count(), 1);
    }

    /// Commit job 7 on node 2, then stage its move to node 1 (node 1's
    /// part is the usual `insertion`).
    fn move_to_node_one(s: &mut crate::Schedule) -> crate::AlternativeId {
        let mut first = Alternative::new();
        first.stage_trajectory(ROOT, NodeId(2), stay(10.0, 10.0, 0.0, 12.0)).unwrap();
        first.add_job(ROOT, job(7, 2, 10.0, 10.0, 10.0, 2.0)).unwrap();
        let id = s.add_alternative(sealed(first)).unwrap();
        s.integrate(id).unwrap();

        let committed = *s.job(JobId(7)).unwrap();
        let mut moved = insertion(7);
        moved.remove_job(ROOT, committed).unwrap();
        s.add_alternative(sealed(moved)).unwrap()
    }

    #[test]
    fn job_moved_between_nodes_stays_indexed() {
        let mut s = schedule();
        let id = move_to_node_one(&mut s);
        s.integrate(id).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.node), Some(NodeId(1)));
        assert_eq!(s.job_count(), 1);
        assert_eq!(s.node(NodeId(2)).unwrap().job_count(), 0);
        s.remove_job(JobId(7)).unwrap();
        assert_eq!(s.job_count(), 0);
    }

    #[test]
    fn job_moved_between_nodes_committed_node_by_node() {
        let mut s = schedule();
        let id = move_to_node_one(&mut s);
        s.integrate_node(id, NodeId(1)).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.node), Some(NodeId(1)));
        s.integrate_node(id, NodeId(2)).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.node), Some(NodeId(1)));
        assert_eq!(s.outstanding_count(), 0);

        let mut s = schedule();
        let id = move_to_node_one(&mut s);
        s.integrate_node(id, NodeId(2)).unwrap();
        assert!(s.job(JobId(7)).is_none());
        s.integrate_node(id, NodeId(1)).unwrap();
        assert_eq!(s.job(JobId(7)).map(|j| j.node), Some(NodeId(1)));
    }

    #[test]
    fn frozen_horizon_is_monotone_and_binding() {
        let mut s = schedule();
        s.set_frozen_horizon(Time(5.0)).unwrap();
        assert!(matches!(s.set_frozen_horizon(Time(3.0)), Err(ScheduleError::HorizonRegression { .. })));
        assert!(matches!(s.add_node(spec(3, 0.0, 0.0)), Err(ScheduleError::BeforeFrozenHorizon { .. })));
        assert!(matches!(
            s.add_alternative(sealed(insertion(7))),
            Err(ScheduleError::BeforeFrozenHorizon { .. })
        ));
        assert_eq!(s.frozen_horizon(), TimeBound::At(Time(5.0)));
    }

    #[test]
    fn clean_up_forgets_finished_jobs() {
        let mut s = schedule();
        assert_eq!(s.clean_up(Time(30.0)), 0);
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        s.integrate(id).unwrap();
        s.set_frozen_horizon(Time(50.0)).unwrap();
        assert_eq!(s.clean_up(Time(30.0)), 1);
        assert!(s.job(JobId(7)).is_none());
        let node = s.node(NodeId(1)).unwrap();
        assert_eq!(node.birth(), Time(30.0));
        assert_eq!(node.location_at(Time(30.0)), Some(Point::new(4.0, 0.0)));
    }

    #[test]
    fn clean_up_stops_at_the_frozen_horizon() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        s.integrate(id).unwrap();
        s.set_frozen_horizon(Time(11.0)).unwrap();
        assert_eq!(s.clean_up(Time(30.0)), 0);
        assert_eq!(s.job(JobId(7)).map(|j| j.node), Some(NodeId(1)));
        assert_eq!(s.node(NodeId(1)).unwrap().birth(), Time(10.0));
    }

    #[test]
    fn only_idle_nodes_removed() {
        let mut s = schedule();
        let id = s.add_alternative(sealed(insertion(7))).unwrap();
        assert_eq!(s.remove_node(NodeId(1)).unwrap_err(), ScheduleError::NodeBusy(NodeId(1)));
        s.integrate(id).unwrap();
        assert_eq!(s.remove_node(NodeId(1)).unwrap_err(), ScheduleError::NodeBusy(NodeId(1)));
        s.remove_node(NodeId(2)).unwrap();
        assert!(s.node(NodeId(2)).is_none());
    }

    #[test]
    fn obstacles_include_other_nodes_and_world() {
        let mut s = schedule();
        let shape = ConvexPolygon::square(Point::default(), 1.0).unwrap();
        s.add_dynamic_obstacle(DynamicObstacle::new(shape, travel((0.0, 5.0), (10.0, 5.0), 0.0, 10.0)));

        let obstacles = s.obstacles_for(NodeId(1), Time(0.0), Time(10.0), None).unwrap();
        assert_eq!(obstacles.len(), 2);
        let other = &obstacles[0];
        assert_eq!(other.trajectory.location_at(Time(5.0)), Some(Point::new(10.0, 10.0)));
        assert!(other.shape.contains(Point::new(0.9, 0.0)));
        assert!(!other.shape.contains(Point::new(1.5, 0.0)));

        let mut alt = Alternative::new();
        alt.stage_trajectory(ROOT, NodeId(2), travel((10.0, 10.0), (10.0, 0.0), 0.0, 10.0)).unwrap();
        let obstacles = s.obstacles_for(NodeId(1), Time(0.0), Time(10.0), Some((&alt, ROOT))).unwrap();
        assert_eq!(obstacles[0].trajectory.location_at(Time(10.0)), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn view_overlays_branch() {
        let s = schedule();
        let alt = insertion(7);
        let view = s.view(NodeId(1), Some((&alt, ROOT))).unwrap();
        assert_eq!(view.job_list().len(), 1);
        assert_eq!(view.location_at(Time(8.0)), Some(Point::new(4.0, 0.0)));
        let bare = s.view(NodeId(1), None).unwrap();
        assert!(bare.job_list().is_empty());
        assert_eq!(bare.location_at(Time(8.0)), Some(Point::new(0.0, 0.0)));
    }
}

#[cfg(test)]
mod locks {
    use proptest::prelude::*;

    use fl_core::{IntervalSet, JobId, NodeId, Time, TimeBound};

    use super::fixtures::{job, schedule, sealed, stay, ROOT};
    use crate::Alternative;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn accepted_alternatives_never_share_locks(
            requests in prop::collection::vec((0.0f64..90.0, 0.5f64..9.0, 0u64..4), 1..8),
        ) {
            let mut s = schedule();
            let mut base = Alternative::new();
            base.stage_trajectory(ROOT, NodeId(1), stay(0.0, 0.0, 0.0, 100.0)).unwrap();
            let id = s.add_alternative(sealed(base)).unwrap();
            s.integrate(id).unwrap();
            let tail = Time(100.0);

            let mut accepted = Vec::new();
            for (start, len, job_id) in requests {
                let mut alt = Alternative::new();
                alt.stage_trajectory(ROOT, NodeId(1), stay(0.0, 0.0, start, start + len)).unwrap();
                alt.add_job(ROOT, job(job_id, 1, 0.0, 0.0, start, len)).unwrap();
                if let Ok(id) = s.add_alternative(sealed(alt)) {
                    accepted.push(id);
                }
            }
            prop_assert!(!accepted.is_empty());

            let claims: Vec<(IntervalSet<TimeBound>, Vec<JobId>)> = accepted
                .iter()
                .map(|id| {
                    let update = s.alternative(*id).unwrap().update(ROOT, NodeId(1)).unwrap();
                    (update.lock_intervals(tail), update.job_additions().map(|j| j.id).collect())
                })
                .collect();
            for (i, a) in claims.iter().enumerate() {
                for b in &claims[i + 1..] {
                    prop_assert!(!a.0.intersects(&b.0));
                    prop_assert!(a.1.iter().all(|id| !b.1.contains(id)));
                }
            }
        }
    }
}
