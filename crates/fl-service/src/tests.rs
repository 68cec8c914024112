//! Unit tests for fl-service.

#[cfg(test)]
mod fixtures {
    use fl_core::{ConvexPolygon, JobId, NodeId, PlannerConfig, Point, Time, TransactionId};
    use fl_node::{Node, NodeSpecification, NodeState};
    use fl_planner::{JobSpecification, LocationSpace};
    use fl_spatial::{Router, VisibilityRouter};

    use crate::{JobScheduler, JobSchedulerBuilder, NoopObserver, TransactionObserver, TransactionOutcome};

    pub fn node(id: u32, x: f64, y: f64) -> NodeSpecification {
        NodeSpecification {
            id: NodeId(id),
            shape: ConvexPolygon::square(Point::default(), 0.5).unwrap(),
            max_speed: 1.0,
            initial_location: Point::new(x, y),
            initial_time: Time(0.0),
        }
    }

    pub fn fleet() -> Vec<NodeSpecification> {
        vec![node(1, 0.0, 0.0), node(2, 10.0, 10.0)]
    }

    pub fn builder<O: TransactionObserver>(observer: O) -> JobSchedulerBuilder<VisibilityRouter, O> {
        JobSchedulerBuilder::new(PlannerConfig::default(), VisibilityRouter::default(), observer).nodes(fleet())
    }

    /// Node 1 at the origin and node 2 at (10, 10), speed 1, no obstacles.
    pub fn scheduler() -> JobScheduler<VisibilityRouter, NoopObserver> {
        builder(NoopObserver).build().unwrap()
    }

    pub fn at(id: u64, x: f64, y: f64, earliest: f64, latest: f64, duration: f64) -> JobSpecification {
        JobSpecification {
            id: JobId(id),
            location: LocationSpace::Point(Point::new(x, y)),
            earliest_start: Time(earliest),
            latest_start: Time(latest),
            duration,
        }
    }

    pub fn close(a: Time, b: f64) -> bool {
        (a.secs() - b).abs() < 1e-6
    }

    /// Every pair of committed nodes keeps its unit-square footprints apart
    /// at every half second of `[0, until]`.
    pub fn assert_apart<R: Router, O: TransactionObserver>(s: &JobScheduler<R, O>, until: f64) {
        let nodes: Vec<&Node> = s.state().nodes().collect();
        for k in 0..=(until * 2.0) as usize {
            let t = Time(k as f64 * 0.5);
            for (i, a) in nodes.iter().enumerate() {
                for b in &nodes[i + 1..] {
                    let (p, q) = (a.location_at(t).unwrap(), b.location_at(t).unwrap());
                    let gap = (p.x - q.x).abs().max((p.y - q.y).abs());
                    assert!(gap >= 1.0 - 1e-6, "{} and {} overlap at {t}: {p:?} {q:?}", a.id(), b.id());
                }
            }
        }
    }

    #[derive(Default)]
    pub struct Recorder {
        pub proposed: Vec<TransactionId>,
        pub committed: Vec<(TransactionId, Option<NodeId>)>,
        pub aborted: Vec<(TransactionId, Option<NodeId>)>,
    }

    impl TransactionObserver for Recorder {
        fn on_proposed(&mut self, outcome: &TransactionOutcome) {
            self.proposed.push(outcome.id);
        }
        fn on_committed(&mut self, id: TransactionId, node: Option<NodeId>) {
            self.committed.push((id, node));
        }
        fn on_aborted(&mut self, id: TransactionId, node: Option<NodeId>) {
            self.aborted.push((id, node));
        }
    }
}

#[cfg(test)]
mod builder {
    use fl_core::{CoreError, NodeId, PlannerConfig, Time};
    use fl_schedule::ScheduleError;
    use fl_spatial::VisibilityRouter;

    use super::fixtures::{builder, fleet, node};
    use crate::{JobSchedulerBuilder, NoopObserver, ServiceError};

    #[test]
    fn builds_with_the_fleet() {
        let s = builder(NoopObserver).build().unwrap();
        assert_eq!(s.state().nodes().count(), 2);
        assert!(s.node(NodeId(2)).is_some());
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PlannerConfig { max_location_picks: 0, ..PlannerConfig::default() };
        let err = JobSchedulerBuilder::new(config, VisibilityRouter::default(), NoopObserver).build().err().unwrap();
        assert!(matches!(err, ServiceError::Config(CoreError::Config(_))));
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let mut nodes = fleet();
        nodes.push(node(1, 5.0, 5.0));
        let err = builder(NoopObserver).nodes(nodes).build().err().unwrap();
        assert_eq!(err, ServiceError::Schedule(ScheduleError::DuplicateNode(NodeId(1))));
    }

    #[test]
    fn nodes_born_before_the_horizon_are_rejected() {
        let err = builder(NoopObserver).frozen_horizon(Time(8.0)).build().err().unwrap();
        assert!(matches!(err, ServiceError::Schedule(ScheduleError::BeforeFrozenHorizon { .. })));
    }
}

#[cfg(test)]
mod transactions {
    use fl_core::{ConvexPolygon, JobId, NodeId, Point, Time, TransactionId};
    use fl_node::NodeState;
    use fl_planner::{DependencyGraph, LocationSpace, PeriodicJobSpecification};
    use fl_schedule::ScheduleError;
    use fl_trajectory::{DynamicObstacle, SpatialPath, Trajectory};

    use super::fixtures::{assert_apart, at, builder, close, scheduler, Recorder};
    use crate::{NoopObserver, ServiceError};

    #[test]
    fn reachable_job_commits_as_requested() {
        let mut s = scheduler();
        let spec = at(1, 3.0, 0.0, 5.0, 10.0, 2.0);
        let outcome = s.schedule(&spec).unwrap();
        assert_eq!(outcome.job_additions.len(), 1);
        assert_eq!(outcome.nodes(), vec![NodeId(1)]);
        assert!(s.is_pending(outcome.id));
        assert!(s.job(JobId(1)).is_none());

        s.commit(outcome.id).unwrap();
        let job = *s.job(JobId(1)).unwrap();
        assert_eq!(job, *outcome.added(JobId(1)).unwrap());
        assert_eq!(job.location, Point::new(3.0, 0.0));
        assert!(job.start_time >= spec.earliest_start && job.start_time <= spec.latest_start);
        assert_eq!(job.duration, 2.0);
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.state().outstanding_count(), 0);

        let node = s.node(NodeId(1)).unwrap();
        assert!(node.location_at(job.start_time + 1.0).unwrap().approx_eq(Point::new(3.0, 0.0), 1e-6));
    }

    #[test]
    fn dependent_batch_commits_in_order() {
        let mut s = scheduler();
        let specs = vec![at(1, 2.0, 0.0, 0.0, 10.0, 2.0), at(2, 4.0, 0.0, 0.0, 10.0, 2.0)];
        let graph: DependencyGraph = [(JobId(2), JobId(1))].into_iter().collect();
        let outcome = s.schedule_dependent(&specs, &graph).unwrap();
        s.commit(outcome.id).unwrap();

        let (first, second) = (*s.job(JobId(1)).unwrap(), *s.job(JobId(2)).unwrap());
        assert!(first.finish_time() + s.config().dependency_margin <= second.start_time);
        assert!(close(second.start_time, 6.0));
    }

    #[test]
    fn infeasible_batch_changes_nothing() {
        let mut s = scheduler();
        let specs = vec![at(1, 2.0, 0.0, 0.0, 10.0, 2.0), at(2, 4.0, 0.0, 0.0, 2.0, 2.0)];
        let graph: DependencyGraph = [(JobId(2), JobId(1))].into_iter().collect();
        let err = s.schedule_dependent(&specs, &graph).unwrap_err();
        assert!(matches!(err, ServiceError::Infeasible(_)));
        assert_eq!(s.state().job_count(), 0);
        assert_eq!(s.state().outstanding_count(), 0);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn moving_obstacle_over_the_destination_is_infeasible() {
        // Drifts across (3, 0) but always covers it.
        let shape = ConvexPolygon::square(Point::default(), 1.0).unwrap();
        let path = SpatialPath::new(vec![Point::new(3.0, -0.2), Point::new(3.0, 0.2)]).unwrap();
        let drift = Trajectory::new(path, vec![Time(0.0), Time(100.0)]).unwrap();
        let mut s = builder(NoopObserver).dynamic_obstacles(vec![DynamicObstacle::new(shape, drift)]).build().unwrap();

        let err = s.schedule(&at(1, 3.0, 0.0, 0.0, 20.0, 1.0)).unwrap_err();
        assert!(matches!(err, ServiceError::Infeasible(_)));
        assert_eq!(s.state().outstanding_count(), 0);
        assert_eq!(s.state().job_count(), 0);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn unscheduled_last_job_leaves_the_node_parked() {
        let mut s = scheduler();
        let placed = s.schedule(&at(1, 3.0, 0.0, 5.0, 5.0, 2.0)).unwrap();
        s.commit(placed.id).unwrap();

        let removal = s.unschedule(JobId(1)).unwrap();
        assert_eq!(removal.job_removals.len(), 1);
        s.commit(removal.id).unwrap();

        assert!(s.job(JobId(1)).is_none());
        let node = s.node(NodeId(1)).unwrap();
        for t in [5.0, 100.0] {
            assert!(node.location_at(Time(t)).unwrap().approx_eq(Point::new(3.0, 0.0), 1e-6));
        }
    }

    #[test]
    fn unknown_job_cannot_be_unscheduled() {
        let mut s = scheduler();
        assert!(matches!(s.unschedule(JobId(9)), Err(ServiceError::Plan(_))));
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn overlapping_proposals_conflict_until_aborted() {
        let mut s = scheduler();
        let first = s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();

        let err = s.schedule(&at(2, 1.0, 0.0, 0.0, 20.0, 1.0)).unwrap_err();
        assert!(matches!(err, ServiceError::Schedule(ScheduleError::Conflict { node: NodeId(1), .. })));
        assert_eq!(s.pending_count(), 1);

        s.abort(first.id).unwrap();
        assert!(!s.is_pending(first.id));
        assert_eq!(s.state().outstanding_count(), 0);
        let second = s.schedule(&at(2, 1.0, 0.0, 0.0, 20.0, 1.0)).unwrap();
        s.commit(second.id).unwrap();
        assert!(s.job(JobId(1)).is_none());
        assert!(close(s.job(JobId(2)).unwrap().start_time, 1.0));
    }

    #[test]
    fn proposed_job_id_is_claimed() {
        let mut s = scheduler();
        s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();
        // Node 2 is free, but job 1 is already claimed.
        assert!(s.schedule(&at(1, 9.0, 10.0, 0.0, 50.0, 1.0)).is_err());
        assert_eq!(s.pending_count(), 1);
    }

    #[test]
    fn node_commit_settles_the_transaction() {
        let mut s = scheduler();
        let outcome = s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();
        s.commit_node(outcome.id, NodeId(1)).unwrap();
        assert!(!s.is_pending(outcome.id));
        assert!(s.job(JobId(1)).is_some());
        assert_eq!(s.commit(outcome.id), Err(ServiceError::UnknownTransaction(outcome.id)));
    }

    #[test]
    fn node_abort_on_an_untouched_node_fails() {
        let mut s = scheduler();
        let outcome = s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();
        assert!(s.abort_node(outcome.id, NodeId(2)).is_err());
        s.abort_node(outcome.id, NodeId(1)).unwrap();
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.state().job_count(), 0);
    }

    #[test]
    fn unknown_transaction_is_an_error() {
        let mut s = scheduler();
        let id = TransactionId::new_random();
        assert_eq!(s.commit(id), Err(ServiceError::UnknownTransaction(id)));
        assert_eq!(s.abort(id), Err(ServiceError::UnknownTransaction(id)));
    }

    #[test]
    fn reschedule_moves_the_job() {
        let mut s = scheduler();
        let placed = s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();
        s.commit(placed.id).unwrap();

        let moved = s.reschedule(&at(1, 5.0, 0.0, 0.0, 20.0, 1.0)).unwrap();
        assert_eq!(moved.job_removals.len(), 1);
        assert_eq!(moved.job_additions.len(), 1);
        s.commit(moved.id).unwrap();

        let job = s.job(JobId(1)).unwrap();
        assert_eq!(job.location, Point::new(5.0, 0.0));
        assert_eq!(s.state().job_count(), 1);
    }

    #[test]
    fn reschedule_hands_the_job_to_another_node() {
        let mut s = scheduler();
        let placed = s.schedule(&at(1, 9.0, 10.0, 2.0, 5.0, 2.0)).unwrap();
        assert_eq!(placed.job_additions[0].node, NodeId(2));
        s.commit(placed.id).unwrap();

        let moved = s.reschedule(&at(1, 2.0, 0.0, 3.0, 10.0, 1.0)).unwrap();
        assert_eq!(moved.job_removals[0].node, NodeId(2));
        assert_eq!(moved.job_additions[0].node, NodeId(1));
        s.commit(moved.id).unwrap();

        assert_eq!(s.job(JobId(1)).map(|j| j.node), Some(NodeId(1)));
        assert_eq!(s.node(NodeId(2)).unwrap().job_count(), 0);
        assert_eq!(s.state().job_count(), 1);
        let gone = s.unschedule(JobId(1)).unwrap();
        s.commit(gone.id).unwrap();
        assert_eq!(s.state().job_count(), 0);
    }

    #[test]
    fn committed_plans_keep_nodes_apart() {
        let mut s = scheduler();
        let requests = [
            at(1, 3.0, 0.0, 5.0, 10.0, 2.0),
            at(2, 9.0, 10.0, 0.0, 5.0, 2.0),
            at(3, 6.0, 6.0, 10.0, 30.0, 1.0),
            at(4, 3.0, 1.0, 20.0, 60.0, 1.0),
            at(5, 0.0, 8.0, 0.0, 40.0, 1.0),
        ];
        let mut committed = 0;
        for spec in &requests {
            if let Ok(outcome) = s.schedule(spec) {
                s.commit(outcome.id).unwrap();
                committed += 1;
                assert_apart(&s, 120.0);
            }
        }
        assert!(committed >= 3);

        let moved = s.reschedule(&at(1, 3.0, 4.0, 30.0, 80.0, 1.0)).unwrap();
        s.commit(moved.id).unwrap();
        assert_apart(&s, 120.0);
    }

    #[test]
    fn periodic_series_commits_whole() {
        let mut s = scheduler();
        let series = PeriodicJobSpecification {
            ids: vec![JobId(10), JobId(11), JobId(12)],
            location: LocationSpace::Point(Point::new(3.0, 0.0)),
            earliest_start: Time(0.0),
            latest_start: Time(5.0),
            duration: 1.0,
            period: 10.0,
            same_location: true,
        };
        let outcome = s.schedule_periodic(&series).unwrap();
        assert_eq!(outcome.job_additions.len(), 3);
        s.commit(outcome.id).unwrap();
        assert_eq!(s.state().job_count(), 3);
    }

    #[test]
    fn horizon_and_clean_up() {
        let mut s = scheduler();
        let outcome = s.schedule(&at(1, 3.0, 0.0, 5.0, 5.0, 2.0)).unwrap();
        s.commit(outcome.id).unwrap();

        s.set_frozen_horizon(Time(10.0)).unwrap();
        assert!(s.set_frozen_horizon(Time(4.0)).is_err());
        assert!(s.unschedule(JobId(1)).is_err());
        assert_eq!(s.clean_up(Time(10.0)), 1);
        assert!(s.job(JobId(1)).is_none());
    }

    #[test]
    fn observer_sees_every_transition() {
        let mut s = builder(Recorder::default()).build().unwrap();
        let a = s.schedule(&at(1, 3.0, 0.0, 5.0, 10.0, 2.0)).unwrap();
        s.commit(a.id).unwrap();
        let b = s.schedule(&at(2, 9.0, 10.0, 0.0, 50.0, 1.0)).unwrap();
        s.abort_node(b.id, NodeId(2)).unwrap();
        assert!(s.schedule(&at(3, 100.0, 0.0, 0.0, 1.0, 1.0)).is_err());

        let seen = s.observer();
        assert_eq!(seen.proposed, vec![a.id, b.id]);
        assert_eq!(seen.committed, vec![(a.id, None)]);
        assert_eq!(seen.aborted, vec![(b.id, Some(NodeId(2)))]);
    }
}
