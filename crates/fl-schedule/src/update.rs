//! `NodeUpdate` — one node's staged, uncommitted changes.

use std::collections::BTreeMap;

use fl_core::{IntervalSet, JobId, NodeId, PlannerConfig, Point, Time, TimeBound};
use fl_node::{Job, Node, NodeError, NodeState};
use fl_trajectory::{Trajectory, TrajectoryContainer};

use crate::{NodeView, ScheduleError, ScheduleResult};

/// Distances and durations below which two values count as equal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    pub location: f64,
    pub time: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from(&PlannerConfig::default())
    }
}

impl From<&PlannerConfig> for Tolerance {
    fn from(cfg: &PlannerConfig) -> Self {
        Self { location: cfg.location_tolerance, time: cfg.time_tolerance }
    }
}

/// A contiguous run of staged trajectory pieces.
#[derive(Copy, Clone, Debug)]
struct Block {
    start: (Time, Point),
    finish: (Time, Point),
}

/// Staged diff for one node: trajectory pieces to write, jobs to add, and
/// committed jobs to remove.
///
/// Open updates accept changes; sealing freezes them before the owning
/// alternative is handed to the schedule.
#[derive(Clone, Debug)]
pub struct NodeUpdate {
    node: NodeId,
    /// Non-overlapping pieces keyed by start time.
    trajectories: BTreeMap<Time, Trajectory>,
    job_additions: BTreeMap<JobId, Job>,
    job_removals: BTreeMap<JobId, Job>,
    sealed: bool,
}

impl NodeUpdate {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            trajectories: BTreeMap::new(),
            job_additions: BTreeMap::new(),
            job_removals: BTreeMap::new(),
            sealed: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty() && self.job_additions.is_empty() && self.job_removals.is_empty()
    }

    /// Staged pieces in time order.
    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> + '_ {
        self.trajectories.values()
    }

    pub fn job_additions(&self) -> impl Iterator<Item = &Job> + '_ {
        self.job_additions.values()
    }

    pub fn job_removals(&self) -> impl Iterator<Item = &Job> + '_ {
        self.job_removals.values()
    }

    pub fn adds_job(&self, id: JobId) -> bool {
        self.job_additions.contains_key(&id)
    }

    pub fn removes_job(&self, id: JobId) -> bool {
        self.job_removals.contains_key(&id)
    }

    // ── Staging ───────────────────────────────────────────────────────────

    fn ensure_open(&self) -> ScheduleResult<()> {
        if self.sealed { Err(ScheduleError::Sealed) } else { Ok(()) }
    }

    /// Stage a trajectory piece, replacing whatever staged pieces it
    /// overlaps.  Overlapped neighbours are clipped to the parts outside
    /// `[start, finish]`.
    pub fn stage_trajectory(&mut self, piece: Trajectory) -> ScheduleResult<()> {
        self.ensure_open()?;
        let (Some(start), Some(finish)) = (piece.start_time(), piece.finish_time()) else {
            return Ok(());
        };
        let overlapping: Vec<Time> = self
            .trajectories
            .range(..finish)
            .filter(|(_, t)| t.finish_time().is_some_and(|f| f > start))
            .map(|(&k, _)| k)
            .collect();
        for key in overlapping {
            let Some(old) = self.trajectories.remove(&key) else { continue };
            let (Some(s), Some(f)) = (old.start_time(), old.finish_time()) else { continue };
            if s < start {
                let left = old.sub_trajectory(s, start);
                if !left.is_empty() {
                    self.trajectories.insert(s, left);
                }
            }
            if f > finish {
                let right = old.sub_trajectory(finish, f);
                if !right.is_empty() {
                    self.trajectories.insert(finish, right);
                }
            }
        }
        self.trajectories.insert(start, piece);
        Ok(())
    }

    pub fn add_job(&mut self, job: Job) -> ScheduleResult<()> {
        self.ensure_open()?;
        job.validate()?;
        if job.node != self.node {
            return Err(NodeError::ForeignJob { job: job.id, owner: job.node, node: self.node }.into());
        }
        if self.job_additions.contains_key(&job.id) {
            return Err(ScheduleError::DuplicateJob(job.id));
        }
        self.job_additions.insert(job.id, job);
        Ok(())
    }

    /// Stage removal of a committed job.
    pub fn remove_job(&mut self, job: Job) -> ScheduleResult<()> {
        self.ensure_open()?;
        if job.node != self.node {
            return Err(NodeError::ForeignJob { job: job.id, owner: job.node, node: self.node }.into());
        }
        if self.job_removals.contains_key(&job.id) {
            return Err(ScheduleError::Inconsistent {
                node:   self.node,
                reason: format!("{} removed twice", job.id),
            });
        }
        self.job_removals.insert(job.id, job);
        Ok(())
    }

    // ── Derived lock intervals ────────────────────────────────────────────

    /// Time covered by staged pieces.  A piece reaching the committed tail
    /// also changes where the node parks afterwards, so its lock runs to
    /// `+∞`.
    pub fn trajectory_intervals(&self, committed_tail: Time) -> IntervalSet<TimeBound> {
        let mut set = IntervalSet::new();
        for piece in self.trajectories.values() {
            let (Some(s), Some(f)) = (piece.start_time(), piece.finish_time()) else { continue };
            let end = if f >= committed_tail { TimeBound::PosInfinity } else { TimeBound::At(f) };
            set.add(TimeBound::At(s), end);
        }
        set
    }

    pub fn addition_intervals(&self) -> IntervalSet<TimeBound> {
        self.job_additions
            .values()
            .map(|j| (TimeBound::At(j.start_time), TimeBound::At(j.finish_time())))
            .collect()
    }

    /// Everything an outstanding copy of this update keeps other
    /// alternatives away from.
    pub fn lock_intervals(&self, committed_tail: Time) -> IntervalSet<TimeBound> {
        self.trajectory_intervals(committed_tail).union(&self.addition_intervals())
    }

    // ── Checks ────────────────────────────────────────────────────────────

    fn blocks(&self, tol: Tolerance) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for piece in self.trajectories.values() {
            let (Some(s), Some(f), Some(a), Some(b)) =
                (piece.start_time(), piece.finish_time(), piece.start_location(), piece.finish_location())
            else {
                continue;
            };
            match blocks.last_mut() {
                Some(last) if s.approx_eq(last.finish.0, tol.time) => last.finish = (f, b),
                _ => blocks.push(Block { start: (s, a), finish: (f, b) }),
            }
        }
        blocks
    }

    /// Reject an update that contradicts itself.
    ///
    /// * adjacent staged pieces must meet where they touch;
    /// * jobs after the update must not overlap;
    /// * every added job must sit still at its location for its whole
    ///   span, judged against the staged trajectory where there is one and
    ///   the committed trajectory elsewhere.
    pub fn check_self_consistency(&self, node: &Node, tol: Tolerance) -> ScheduleResult<()> {
        let pieces: Vec<&Trajectory> = self.trajectories.values().collect();
        for pair in pieces.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some(af), Some(bs)) = (a.finish_time(), b.start_time()) else { continue };
            if !bs.approx_eq(af, tol.time) {
                continue;
            }
            let meets = matches!(
                (a.finish_location(), b.start_location()),
                (Some(p), Some(q)) if p.approx_eq(q, tol.location)
            );
            if !meets {
                return Err(ScheduleError::Discontinuous { node: self.node, at: bs });
            }
        }

        let view = NodeView::new(node, Some(self))?;
        let jobs = view.job_list();
        for pair in jobs.windows(2) {
            if pair[1].start_time < pair[0].finish_time() {
                return Err(ScheduleError::Inconsistent {
                    node:   self.node,
                    reason: format!("{} overlaps {}", pair[0].id, pair[1].id),
                });
            }
        }

        for job in self.job_additions.values() {
            if job.start_time < view.birth() {
                return Err(NodeError::JobBeforeBirth { job: job.id, start: job.start_time, birth: view.birth() }.into());
            }
            let span = view.trajectory_slice(job.start_time, job.finish_time());
            if span.is_empty() || !span.is_stationary_at(job.location, tol.location) {
                return Err(ScheduleError::Inconsistent {
                    node:   self.node,
                    reason: format!("{} is not stationary at {} over its span", job.id, job.location),
                });
            }
        }
        Ok(())
    }

    /// Reject staged pieces that do not join the committed trajectory at
    /// either end of each contiguous block.  The far end is free when the
    /// block reaches past the committed tail.
    pub fn check_splices(&self, node: &Node, tol: Tolerance) -> ScheduleResult<()> {
        let committed = node.trajectory();
        let tail = committed.finish_time().unwrap_or(committed.birth());
        for block in self.blocks(tol) {
            let (s, a) = block.start;
            let joins_start = committed.location_at(s).is_some_and(|p| p.approx_eq(a, tol.location));
            if !joins_start {
                return Err(ScheduleError::Discontinuous { node: self.node, at: s });
            }
            let (f, b) = block.finish;
            if f < tail {
                let joins_finish = committed.location_at(f).is_some_and(|p| p.approx_eq(b, tol.location));
                if !joins_finish {
                    return Err(ScheduleError::Discontinuous { node: self.node, at: f });
                }
            }
        }
        Ok(())
    }

    /// Write the staged pieces into `container` in time order.
    pub(crate) fn apply_to(&self, container: &mut TrajectoryContainer) -> ScheduleResult<()> {
        for piece in self.trajectories.values() {
            container.update(piece.clone())?;
        }
        Ok(())
    }

    /// Earliest instant this update touches.
    pub fn earliest_time(&self) -> Option<Time> {
        let pieces = self.trajectories.keys().next().copied();
        let adds = self.job_additions.values().map(|j| j.start_time).min();
        let removes = self.job_removals.values().map(|j| j.start_time).min();
        [pieces, adds, removes].into_iter().flatten().min()
    }
}
