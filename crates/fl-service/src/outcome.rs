//! What a proposed transaction would change.

use std::collections::BTreeMap;

use fl_core::{JobId, NodeId, TransactionId};
use fl_node::Job;
use fl_schedule::Alternative;
use fl_trajectory::Trajectory;

/// The net effect of one transaction, reported when it is proposed.
///
/// Nothing here is committed yet; pass `id` to
/// [`JobScheduler::commit`](crate::JobScheduler::commit) or
/// [`JobScheduler::abort`](crate::JobScheduler::abort).
#[derive(Clone, Debug)]
pub struct TransactionOutcome {
    pub id: TransactionId,
    pub job_additions: Vec<Job>,
    pub job_removals: Vec<Job>,
    /// New trajectory pieces per node, in time order.
    pub trajectory_updates: BTreeMap<NodeId, Vec<Trajectory>>,
}

impl TransactionOutcome {
    pub(crate) fn of(id: TransactionId, alternative: &Alternative) -> Self {
        let mut outcome = Self {
            id,
            job_additions: Vec::new(),
            job_removals: Vec::new(),
            trajectory_updates: BTreeMap::new(),
        };
        for update in alternative.updates() {
            outcome.job_additions.extend(update.job_additions().copied());
            outcome.job_removals.extend(update.job_removals().copied());
            let pieces: Vec<Trajectory> = update.trajectories().cloned().collect();
            if !pieces.is_empty() {
                outcome.trajectory_updates.insert(update.node(), pieces);
            }
        }
        outcome
    }

    /// Nodes the transaction touches.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .job_additions
            .iter()
            .chain(&self.job_removals)
            .map(|j| j.node)
            .chain(self.trajectory_updates.keys().copied())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    pub fn added(&self, id: JobId) -> Option<&Job> {
        self.job_additions.iter().find(|j| j.id == id)
    }
}
