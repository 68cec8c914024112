//! The authoritative schedule.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use fl_core::{IntervalSet, JobId, NodeId, PlannerConfig, Time, TimeBound};
use fl_node::{Job, Node, NodeSpecification, NodeState};
use fl_spatial::World;
use fl_trajectory::{DynamicObstacle, Trajectory, TrajectoryContainer};

use crate::{Alternative, BranchId, NodeUpdate, NodeView, ScheduleError, ScheduleResult, Tolerance};

/// Handle to an alternative the schedule has accepted but not yet resolved.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct AlternativeId(pub u64);

impl fmt::Display for AlternativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlternativeId({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct Outstanding {
    alternative: Alternative,
    /// Trajectory locks taken per node at acceptance.
    locks: BTreeMap<NodeId, IntervalSet<TimeBound>>,
}

/// Committed nodes and jobs, plus the alternatives waiting to be integrated
/// or eliminated.
///
/// Every mutation of committed state goes through here.  Accepting an
/// alternative validates all of it before taking any lock, so a rejected
/// alternative leaves no trace.
#[derive(Debug)]
pub struct Schedule {
    world: World,
    tolerance: Tolerance,
    nodes: BTreeMap<NodeId, Node>,
    job_index: FxHashMap<JobId, NodeId>,
    outstanding: BTreeMap<AlternativeId, Outstanding>,
    /// Ids of jobs outstanding alternatives intend to add.
    claimed_jobs: FxHashSet<JobId>,
    dynamic_obstacles: Vec<DynamicObstacle>,
    frozen_horizon: TimeBound,
    next_alternative: u64,
}

impl Schedule {
    pub fn new(world: World, config: &PlannerConfig) -> Self {
        Self {
            world,
            tolerance: Tolerance::from(config),
            nodes: BTreeMap::new(),
            job_index: FxHashMap::default(),
            outstanding: BTreeMap::new(),
            claimed_jobs: FxHashSet::default(),
            dynamic_obstacles: Vec::new(),
            frozen_horizon: TimeBound::NegInfinity,
            next_alternative: 0,
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.job_index.get(&id).and_then(|n| self.nodes.get(n)).and_then(|n| n.job(id))
    }

    pub fn job_count(&self) -> usize {
        self.job_index.len()
    }

    pub fn alternative(&self, id: AlternativeId) -> Option<&Alternative> {
        self.outstanding.get(&id).map(|o| &o.alternative)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    pub fn dynamic_obstacles(&self) -> &[DynamicObstacle] {
        &self.dynamic_obstacles
    }

    /// `node` as it would be with `staged`'s update for it applied.
    pub fn view<'a>(
        &'a self,
        node: NodeId,
        staged: Option<(&'a Alternative, BranchId)>,
    ) -> ScheduleResult<NodeView<'a>> {
        let committed = self.nodes.get(&node).ok_or(ScheduleError::UnknownNode(node))?;
        let update = staged.and_then(|(alt, branch)| alt.update(branch, node));
        NodeView::new(committed, update)
    }

    /// Everything `node` must avoid over `[from, to]`: the other nodes as
    /// committed, with outstanding alternatives and `staged` applied, and
    /// the world's moving obstacles.  Footprints are grown by `node`'s
    /// radius so the planner can treat the node as a point.
    pub fn obstacles_for(
        &self,
        node: NodeId,
        from: Time,
        to: Time,
        staged: Option<(&Alternative, BranchId)>,
    ) -> ScheduleResult<Vec<DynamicObstacle>> {
        let radius = self.nodes.get(&node).ok_or(ScheduleError::UnknownNode(node))?.spec().radius();
        let mut obstacles = Vec::new();

        for (&id, other) in &self.nodes {
            if id == node {
                continue;
            }
            let trajectory = self.planned_history(id, other, staged)?.slice(from, to);
            if !trajectory.is_empty() {
                obstacles.push(DynamicObstacle::new(other.spec().shape.clone(), trajectory).buffered(radius));
            }
        }

        for obstacle in &self.dynamic_obstacles {
            let trajectory = obstacle.trajectory.sub_trajectory(from, to);
            if !trajectory.is_empty() {
                obstacles.push(DynamicObstacle::new(obstacle.shape.buffered(radius), trajectory));
            }
        }
        Ok(obstacles)
    }

    /// The last instant anything `node` must avoid is still moving: the end
    /// of every other node's planned history, with outstanding alternatives
    /// and `staged` applied, and of every moving obstacle.  Past it the
    /// world around `node` is static.
    pub fn last_activity(
        &self,
        node: NodeId,
        staged: Option<(&Alternative, BranchId)>,
    ) -> ScheduleResult<Option<Time>> {
        if !self.nodes.contains_key(&node) {
            return Err(ScheduleError::UnknownNode(node));
        }
        let mut last = None;
        for (&id, other) in &self.nodes {
            if id != node {
                last = last.max(self.planned_history(id, other, staged)?.finish_time());
            }
        }
        let obstacles = self.dynamic_obstacles.iter().filter_map(|o| o.trajectory.finish_time()).max();
        Ok(last.max(obstacles))
    }

    /// `other`'s committed history with every outstanding alternative and
    /// `staged` written over it.
    fn planned_history(
        &self,
        id: NodeId,
        other: &Node,
        staged: Option<(&Alternative, BranchId)>,
    ) -> ScheduleResult<TrajectoryContainer> {
        let mut history = other.trajectory().clone();
        for pending in self.outstanding.values() {
            if let Some(update) = pending.alternative.update(Alternative::ROOT, id) {
                update.apply_to(&mut history)?;
            }
        }
        if let Some(update) = staged.and_then(|(alt, branch)| alt.update(branch, id)) {
            update.apply_to(&mut history)?;
        }
        Ok(history)
    }

    // ── Frozen horizon & maintenance ──────────────────────────────────────

    pub fn frozen_horizon(&self) -> TimeBound {
        self.frozen_horizon
    }

    /// Move the frozen horizon forward.  It never moves back.
    pub fn set_frozen_horizon(&mut self, t: Time) -> ScheduleResult<()> {
        if TimeBound::At(t) < self.frozen_horizon {
            return Err(ScheduleError::HorizonRegression { current: self.frozen_horizon, requested: t });
        }
        self.frozen_horizon = TimeBound::At(t);
        Ok(())
    }

    fn ensure_after_horizon(&self, what: &'static str, time: Time) -> ScheduleResult<()> {
        if TimeBound::At(time) < self.frozen_horizon {
            return Err(ScheduleError::BeforeFrozenHorizon { what, time, horizon: self.frozen_horizon });
        }
        Ok(())
    }

    /// Forget committed history and finished jobs before `present`, never
    /// past the frozen horizon.  Removal-locked jobs are kept.  Returns the
    /// number of jobs forgotten.
    pub fn clean_up(&mut self, present: Time) -> usize {
        let watermark = match self.frozen_horizon {
            TimeBound::NegInfinity => return 0,
            TimeBound::At(h) => present.min(h),
            TimeBound::PosInfinity => present,
        };
        let mut forgotten = 0;
        for (&id, node) in self.nodes.iter_mut() {
            for job in node.clean_up(watermark) {
                unindex(&mut self.job_index, job.id, id);
                forgotten += 1;
            }
        }
        debug!(%watermark, forgotten, "schedule cleaned up");
        forgotten
    }

    // ── Nodes & jobs ──────────────────────────────────────────────────────

    pub fn add_node(&mut self, spec: NodeSpecification) -> ScheduleResult<&Node> {
        if self.nodes.contains_key(&spec.id) {
            return Err(ScheduleError::DuplicateNode(spec.id));
        }
        self.ensure_after_horizon("node birth", spec.initial_time)?;
        let node = Node::new(spec)?;
        let id = node.spec().id;
        debug!(%id, "node added");
        Ok(&*self.nodes.entry(id).or_insert(node))
    }

    /// Remove a node with no jobs and no outstanding alternative touching it.
    pub fn remove_node(&mut self, id: NodeId) -> ScheduleResult<Node> {
        let node = self.nodes.get(&id).ok_or(ScheduleError::UnknownNode(id))?;
        if !node.is_idle() {
            return Err(ScheduleError::NodeBusy(id));
        }
        debug!(%id, "node removed");
        self.nodes.remove(&id).ok_or(ScheduleError::UnknownNode(id))
    }

    pub fn add_dynamic_obstacle(&mut self, obstacle: DynamicObstacle) {
        self.dynamic_obstacles.push(obstacle);
    }

    /// Drop a committed job without touching its node's trajectory.
    pub fn remove_job(&mut self, id: JobId) -> ScheduleResult<Job> {
        let node_id = *self.job_index.get(&id).ok_or(ScheduleError::UnknownJob(id))?;
        let node = self.nodes.get_mut(&node_id).ok_or(ScheduleError::UnknownNode(node_id))?;
        if node.is_removal_locked(id) {
            return Err(ScheduleError::RemovalLocked(id));
        }
        let job = node.remove_job(id)?;
        self.job_index.remove(&id);
        debug!(%id, node = %node_id, "job removed");
        Ok(job)
    }

    // ── Alternatives ──────────────────────────────────────────────────────

    /// Validate a sealed alternative against committed state and every
    /// outstanding alternative, then lock what it touches.
    pub fn add_alternative(&mut self, alternative: Alternative) -> ScheduleResult<AlternativeId> {
        if !alternative.is_sealed() {
            return Err(ScheduleError::NotSealed);
        }
        let locks = match self.validate(&alternative) {
            Ok(locks) => locks,
            Err(err) => {
                debug!(%err, "alternative rejected");
                return Err(err);
            }
        };

        for update in alternative.updates() {
            for job in update.job_additions() {
                self.claimed_jobs.insert(job.id);
            }
            let Some(node) = self.nodes.get_mut(&update.node()) else { continue };
            if let Some(set) = locks.get(&update.node()) {
                node.lock_trajectory(set);
            }
            for job in update.job_removals() {
                node.lock_removal(job.id);
            }
        }

        let id = AlternativeId(self.next_alternative);
        self.next_alternative += 1;
        debug!(%id, nodes = locks.len(), "alternative accepted");
        self.outstanding.insert(id, Outstanding { alternative, locks });
        Ok(id)
    }

    fn validate(&self, alternative: &Alternative) -> ScheduleResult<BTreeMap<NodeId, IntervalSet<TimeBound>>> {
        let removed: FxHashSet<JobId> =
            alternative.updates().flat_map(|u| u.job_removals()).map(|j| j.id).collect();
        let mut added: FxHashSet<JobId> = FxHashSet::default();
        let mut locks = BTreeMap::new();

        for update in alternative.updates() {
            let node = self.nodes.get(&update.node()).ok_or(ScheduleError::UnknownNode(update.node()))?;
            update.check_self_consistency(node, self.tolerance)?;
            if let Some(t) = update.earliest_time() {
                self.ensure_after_horizon("staged change", t)?;
            }

            for job in update.job_removals() {
                match node.job(job.id) {
                    Some(committed) if committed.start_time == job.start_time => {}
                    _ => return Err(ScheduleError::UnknownJob(job.id)),
                }
                if node.is_removal_locked(job.id) {
                    return Err(ScheduleError::RemovalLocked(job.id));
                }
            }

            for job in update.job_additions() {
                let committed_elsewhere = self.job_index.contains_key(&job.id) && !removed.contains(&job.id);
                if committed_elsewhere || self.claimed_jobs.contains(&job.id) || !added.insert(job.id) {
                    return Err(ScheduleError::DuplicateJob(job.id));
                }
            }

            let tail = node.trajectory().finish_time().unwrap_or(node.trajectory().birth());
            let lock = update.lock_intervals(tail);
            if node.is_trajectory_locked(&lock) {
                return Err(ScheduleError::Conflict {
                    node:   node.spec().id,
                    reason: "overlaps an outstanding alternative".into(),
                });
            }
            let kept = node
                .jobs()
                .filter(|j| !update.removes_job(j.id))
                .find(|j| lock.intersects_range(TimeBound::At(j.start_time), TimeBound::At(j.finish_time())));
            if let Some(job) = kept {
                return Err(ScheduleError::Conflict {
                    node:   node.spec().id,
                    reason: format!("rewrites the trajectory under committed {}", job.id),
                });
            }

            update.check_splices(node, self.tolerance)?;
            locks.insert(update.node(), lock);
        }
        Ok(locks)
    }

    /// Pop one node's update, releasing every lock it held.
    fn release(&mut self, id: AlternativeId, node_id: NodeId) -> ScheduleResult<NodeUpdate> {
        let pending = self.outstanding.get_mut(&id).ok_or(ScheduleError::UnknownAlternative(id))?;
        let update = pending.alternative.take_node(node_id).ok_or(ScheduleError::UnknownNode(node_id))?;
        let locks = pending.locks.remove(&node_id).unwrap_or_default();
        if pending.alternative.is_empty() {
            self.outstanding.remove(&id);
        }

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.unlock_trajectory(&locks);
            for job in update.job_removals() {
                node.unlock_removal(job.id);
            }
        }
        for job in update.job_additions() {
            self.claimed_jobs.remove(&job.id);
        }
        Ok(update)
    }

    fn apply(&mut self, update: &NodeUpdate) -> ScheduleResult<()> {
        let node_id = update.node();
        let node = self.nodes.get_mut(&node_id).ok_or(ScheduleError::UnknownNode(node_id))?;
        for job in update.job_removals() {
            node.remove_job(job.id)?;
            unindex(&mut self.job_index, job.id, node_id);
        }
        for piece in update.trajectories() {
            node.update_trajectory(Trajectory::clone(piece))?;
        }
        for job in update.job_additions() {
            node.add_job(*job)?;
            self.job_index.insert(job.id, node_id);
        }
        Ok(())
    }

    /// Apply one node's part of an outstanding alternative.
    pub fn integrate_node(&mut self, id: AlternativeId, node: NodeId) -> ScheduleResult<()> {
        let update = self.release(id, node)?;
        self.apply(&update)?;
        debug!(%id, %node, "node update integrated");
        Ok(())
    }

    /// Discard one node's part of an outstanding alternative.
    pub fn eliminate_node(&mut self, id: AlternativeId, node: NodeId) -> ScheduleResult<()> {
        self.release(id, node)?;
        debug!(%id, %node, "node update eliminated");
        Ok(())
    }

    pub fn integrate(&mut self, id: AlternativeId) -> ScheduleResult<()> {
        let nodes = self.alternative(id).ok_or(ScheduleError::UnknownAlternative(id))?.node_ids();
        for node in nodes {
            let update = self.release(id, node)?;
            self.apply(&update)?;
        }
        self.outstanding.remove(&id);
        debug!(%id, "alternative integrated");
        Ok(())
    }

    pub fn eliminate(&mut self, id: AlternativeId) -> ScheduleResult<()> {
        let nodes = self.alternative(id).ok_or(ScheduleError::UnknownAlternative(id))?.node_ids();
        for node in nodes {
            self.release(id, node)?;
        }
        self.outstanding.remove(&id);
        debug!(%id, "alternative eliminated");
        Ok(())
    }
}

/// Drop `job` from the index unless it has already moved to another node.
/// A job moved between nodes may be added on its new node before the old
/// node's removal is applied.
fn unindex(index: &mut FxHashMap<JobId, NodeId>, job: JobId, node: NodeId) {
    if index.get(&job) == Some(&node) {
        index.remove(&job);
    }
}
