//! `Alternative` — a speculative, branchable bundle of node updates.
//!
//! Branches live in an arena indexed by [`BranchId`].  Branching copies the
//! parent's state into a new slot and marks the parent as branched; a
//! branched parent accepts no changes until every child has been merged
//! back or deleted.  Only the root, once unbranched, can be sealed, and only
//! a sealed alternative can be offered to the [`Schedule`](crate::Schedule).

use std::collections::BTreeMap;
use std::fmt;

use fl_core::{JobId, NodeId};
use fl_node::Job;
use fl_trajectory::Trajectory;

use crate::{NodeUpdate, ScheduleError, ScheduleResult};

/// Handle to one branch of an [`Alternative`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct BranchId(pub u32);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.0)
    }
}

#[derive(Clone, Debug, Default)]
struct BranchState {
    updates: BTreeMap<NodeId, NodeUpdate>,
    /// Staged job additions across all nodes.
    jobs: BTreeMap<JobId, Job>,
}

#[derive(Clone, Debug)]
struct Branch {
    parent: Option<BranchId>,
    open_children: u32,
    state: BranchState,
}

#[derive(Clone, Debug)]
pub struct Alternative {
    branches: Vec<Option<Branch>>,
    sealed: bool,
}

impl Default for Alternative {
    fn default() -> Self {
        Self::new()
    }
}

impl Alternative {
    pub const ROOT: BranchId = BranchId(0);

    pub fn new() -> Self {
        let root = Branch { parent: None, open_children: 0, state: BranchState::default() };
        Self { branches: vec![Some(root)], sealed: false }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn get(&self, id: BranchId) -> ScheduleResult<&Branch> {
        self.branches
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(ScheduleError::UnknownBranch(id))
    }

    fn get_mut(&mut self, id: BranchId) -> ScheduleResult<&mut Branch> {
        self.branches
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(ScheduleError::UnknownBranch(id))
    }

    /// The branch's state, if it may currently be modified.
    fn writable(&mut self, id: BranchId) -> ScheduleResult<&mut BranchState> {
        if self.sealed {
            return Err(ScheduleError::Sealed);
        }
        let branch = self.get_mut(id)?;
        if branch.open_children > 0 {
            return Err(ScheduleError::Branched(id));
        }
        Ok(&mut branch.state)
    }

    // ── Branch tree ───────────────────────────────────────────────────────

    /// Open a child of `parent` holding a copy of its state.
    pub fn branch(&mut self, parent: BranchId) -> ScheduleResult<BranchId> {
        let state = self.writable(parent)?.clone();
        self.get_mut(parent)?.open_children += 1;
        let id = BranchId(self.branches.len() as u32);
        self.branches.push(Some(Branch { parent: Some(parent), open_children: 0, state }));
        Ok(id)
    }

    /// Replace the parent's state with `child`'s.  `child` must be the
    /// parent's only open child and have no open children itself.
    pub fn merge(&mut self, child: BranchId) -> ScheduleResult<()> {
        let branch = self.get(child)?;
        let parent = branch.parent.ok_or(ScheduleError::NotMergeable(child))?;
        if branch.open_children > 0 {
            return Err(ScheduleError::Branched(child));
        }
        if self.get(parent)?.open_children != 1 {
            return Err(ScheduleError::NotMergeable(child));
        }
        let branch = self.branches[child.0 as usize].take().ok_or(ScheduleError::UnknownBranch(child))?;
        let target = self.get_mut(parent)?;
        target.state = branch.state;
        target.open_children -= 1;
        Ok(())
    }

    /// Discard `child` and everything staged on it.
    pub fn delete(&mut self, child: BranchId) -> ScheduleResult<()> {
        let branch = self.get(child)?;
        let parent = branch.parent.ok_or(ScheduleError::NotMergeable(child))?;
        if branch.open_children > 0 {
            return Err(ScheduleError::Branched(child));
        }
        self.branches[child.0 as usize] = None;
        self.get_mut(parent)?.open_children -= 1;
        Ok(())
    }

    /// Freeze the alternative.  The root must have no open children.
    pub fn seal(&mut self) -> ScheduleResult<()> {
        let root = self.writable(Self::ROOT)?;
        for update in root.updates.values_mut() {
            update.seal();
        }
        self.sealed = true;
        self.branches.truncate(1);
        Ok(())
    }

    // ── Staging ───────────────────────────────────────────────────────────

    pub fn stage_trajectory(&mut self, branch: BranchId, node: NodeId, piece: Trajectory) -> ScheduleResult<()> {
        let state = self.writable(branch)?;
        state.updates.entry(node).or_insert_with(|| NodeUpdate::new(node)).stage_trajectory(piece)
    }

    pub fn add_job(&mut self, branch: BranchId, job: Job) -> ScheduleResult<()> {
        let state = self.writable(branch)?;
        if state.jobs.contains_key(&job.id) {
            return Err(ScheduleError::DuplicateJob(job.id));
        }
        state.updates.entry(job.node).or_insert_with(|| NodeUpdate::new(job.node)).add_job(job)?;
        state.jobs.insert(job.id, job);
        Ok(())
    }

    /// Stage removal of a committed job.
    pub fn remove_job(&mut self, branch: BranchId, job: Job) -> ScheduleResult<()> {
        let state = self.writable(branch)?;
        state.updates.entry(job.node).or_insert_with(|| NodeUpdate::new(job.node)).remove_job(job)
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn update(&self, branch: BranchId, node: NodeId) -> Option<&NodeUpdate> {
        self.get(branch).ok()?.state.updates.get(&node)
    }

    /// Updates staged on `branch`, by node id.
    pub fn updates_on(&self, branch: BranchId) -> impl Iterator<Item = &NodeUpdate> + '_ {
        self.get(branch).ok().into_iter().flat_map(|b| b.state.updates.values())
    }

    /// Updates staged on the root.
    pub fn updates(&self) -> impl Iterator<Item = &NodeUpdate> + '_ {
        self.updates_on(Self::ROOT)
    }

    /// A job staged for addition on `branch`.
    pub fn job(&self, branch: BranchId, id: JobId) -> Option<&Job> {
        self.get(branch).ok()?.state.jobs.get(&id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.updates().map(NodeUpdate::node).collect()
    }

    /// `true` once the root holds no updates.
    pub fn is_empty(&self) -> bool {
        self.updates().next().is_none()
    }

    /// Pop one node's update off a sealed root.
    pub(crate) fn take_node(&mut self, node: NodeId) -> Option<NodeUpdate> {
        if !self.sealed {
            return None;
        }
        let root = self.branches.first_mut()?.as_mut()?;
        let update = root.state.updates.remove(&node)?;
        for job in update.job_additions() {
            root.state.jobs.remove(&job.id);
        }
        Some(update)
    }
}
