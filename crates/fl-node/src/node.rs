//! The committed node.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use fl_core::{IntervalSet, JobId, Point, Time, TimeBound};
use fl_spatial::World;
use fl_trajectory::{Trajectory, TrajectoryContainer};

use crate::{Job, NodeError, NodeResult, NodeSpecification, NodeState};

/// One mobile agent's committed state.
///
/// Only the schedule mutates a node, and only while integrating an accepted
/// alternative or cleaning up.  Two kinds of lock record what outstanding
/// alternatives intend to change:
///
/// * **removal locks** name committed jobs an alternative wants to remove;
/// * **trajectory locks** are time intervals an alternative wants to rewrite.
#[derive(Clone, Debug)]
pub struct Node {
    spec: NodeSpecification,
    /// Committed jobs keyed by start time.  Jobs never overlap, so start
    /// times are unique.
    jobs: BTreeMap<Time, Job>,
    job_starts: FxHashMap<JobId, Time>,
    trajectory: TrajectoryContainer,
    removal_locks: FxHashSet<JobId>,
    trajectory_locks: IntervalSet<TimeBound>,
}

impl Node {
    pub fn new(spec: NodeSpecification) -> NodeResult<Self> {
        spec.validate()?;
        let trajectory = TrajectoryContainer::new(spec.initial_location, spec.initial_time);
        Ok(Self {
            spec,
            jobs: BTreeMap::new(),
            job_starts: FxHashMap::default(),
            trajectory,
            removal_locks: FxHashSet::default(),
            trajectory_locks: IntervalSet::new(),
        })
    }

    // ── Jobs ──────────────────────────────────────────────────────────────

    /// Committed jobs in start-time order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.values()
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.job_starts.get(&id).and_then(|t| self.jobs.get(t))
    }

    pub fn has_job(&self, id: JobId) -> bool {
        self.job_starts.contains_key(&id)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Committed jobs meeting `[from, to)`.
    pub fn jobs_overlapping(&self, from: Time, to: Time) -> impl Iterator<Item = &Job> + '_ {
        let lead = self.jobs.range(..from).next_back().map(|(&k, _)| k).unwrap_or(from);
        self.jobs.range(lead..to.max(lead)).map(|(_, j)| j).filter(move |j| j.overlaps(from, to))
    }

    /// Check that `job` could be committed here.  Does not mutate.
    pub fn check_job(&self, job: &Job) -> NodeResult<()> {
        job.validate()?;
        if job.node != self.spec.id {
            return Err(NodeError::ForeignJob { job: job.id, owner: job.node, node: self.spec.id });
        }
        if self.has_job(job.id) {
            return Err(NodeError::DuplicateJob { job: job.id });
        }
        if job.start_time < self.trajectory.birth() {
            return Err(NodeError::JobBeforeBirth {
                job:   job.id,
                start: job.start_time,
                birth: self.trajectory.birth(),
            });
        }
        if let Some(other) = self.jobs_overlapping(job.start_time, job.finish_time()).next() {
            return Err(NodeError::JobOverlap { job: job.id, other: other.id });
        }
        Ok(())
    }

    pub fn add_job(&mut self, job: Job) -> NodeResult<()> {
        self.check_job(&job)?;
        self.job_starts.insert(job.id, job.start_time);
        self.jobs.insert(job.start_time, job);
        Ok(())
    }

    /// Remove a job, releasing its removal lock if one was held.
    pub fn remove_job(&mut self, id: JobId) -> NodeResult<Job> {
        let start = self.job_starts.remove(&id).ok_or(NodeError::UnknownJob(id))?;
        self.removal_locks.remove(&id);
        self.jobs.remove(&start).ok_or(NodeError::UnknownJob(id))
    }

    // ── Trajectory ────────────────────────────────────────────────────────

    pub fn trajectory(&self) -> &TrajectoryContainer {
        &self.trajectory
    }

    /// Write a segment into the history; see [`TrajectoryContainer::update`].
    pub fn update_trajectory(&mut self, segment: Trajectory) -> NodeResult<()> {
        Ok(self.trajectory.update(segment)?)
    }

    /// The static world as this node's reference point sees it: every
    /// obstacle grown by the node's radius.
    pub fn perceived_world(&self, world: &World) -> World {
        world.perceived_by(self.spec.radius())
    }

    /// No committed jobs and no outstanding alternative touching the node.
    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty() && self.removal_locks.is_empty() && self.trajectory_locks.is_empty()
    }

    // ── Locks ─────────────────────────────────────────────────────────────

    pub fn is_removal_locked(&self, id: JobId) -> bool {
        self.removal_locks.contains(&id)
    }

    /// Returns `false` if the lock was already held.
    pub fn lock_removal(&mut self, id: JobId) -> bool {
        self.removal_locks.insert(id)
    }

    pub fn unlock_removal(&mut self, id: JobId) -> bool {
        self.removal_locks.remove(&id)
    }

    pub fn trajectory_locks(&self) -> &IntervalSet<TimeBound> {
        &self.trajectory_locks
    }

    pub fn is_trajectory_locked(&self, locks: &IntervalSet<TimeBound>) -> bool {
        self.trajectory_locks.intersects(locks)
    }

    pub fn lock_trajectory(&mut self, locks: &IntervalSet<TimeBound>) {
        for (start, end) in locks.iter() {
            self.trajectory_locks.add(start, end);
        }
    }

    pub fn unlock_trajectory(&mut self, locks: &IntervalSet<TimeBound>) {
        for (start, end) in locks.iter() {
            self.trajectory_locks.remove(start, end);
        }
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Forget jobs finished before `before` and trajectory history before
    /// the earliest instant still needed.  Removal-locked jobs survive, and
    /// so does the history back to the earliest of them or of any locked
    /// trajectory interval.  Returns the forgotten jobs.
    pub fn clean_up(&mut self, before: Time) -> Vec<Job> {
        let stale: Vec<Job> = self
            .jobs
            .values()
            .filter(|j| j.finish_time() < before && !self.removal_locks.contains(&j.id))
            .copied()
            .collect();
        for job in &stale {
            self.jobs.remove(&job.start_time);
            self.job_starts.remove(&job.id);
        }

        let mut keep_from = before;
        if let Some(first) = self.jobs.values().next() {
            keep_from = keep_from.min(first.start_time);
        }
        match self.trajectory_locks.min() {
            Some(TimeBound::At(t)) => keep_from = keep_from.min(t),
            Some(TimeBound::NegInfinity) => keep_from = self.trajectory.birth(),
            _ => {}
        }
        self.trajectory.discard_before(keep_from);
        stale
    }
}

impl NodeState for Node {
    fn spec(&self) -> &NodeSpecification {
        &self.spec
    }

    fn birth(&self) -> Time {
        self.trajectory.birth()
    }

    fn job_list(&self) -> Vec<Job> {
        self.jobs.values().copied().collect()
    }

    fn location_at(&self, t: Time) -> Option<Point> {
        self.trajectory.location_at(t)
    }

    fn trajectory_slice(&self, from: Time, to: Time) -> Trajectory {
        self.trajectory.slice(from, to)
    }
}
