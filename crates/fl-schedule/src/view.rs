//! Committed node state overlaid with staged changes.

use std::borrow::Cow;

use fl_core::{Point, Time};
use fl_node::{Job, Node, NodeSpecification, NodeState};
use fl_trajectory::{Trajectory, TrajectoryContainer};

use crate::{NodeUpdate, ScheduleResult};

/// What a node would look like if `update` were integrated now.
///
/// With no update this is just the committed node.  Planners read nodes
/// through a view so that several jobs staged for the same node within one
/// alternative see each other.
#[derive(Clone, Debug)]
pub struct NodeView<'a> {
    node: &'a Node,
    update: Option<&'a NodeUpdate>,
    trajectory: Cow<'a, TrajectoryContainer>,
}

impl<'a> NodeView<'a> {
    pub fn new(node: &'a Node, update: Option<&'a NodeUpdate>) -> ScheduleResult<Self> {
        let trajectory = match update {
            Some(u) if u.trajectories().next().is_some() => {
                let mut merged = node.trajectory().clone();
                u.apply_to(&mut merged)?;
                Cow::Owned(merged)
            }
            _ => Cow::Borrowed(node.trajectory()),
        };
        Ok(Self { node, update, trajectory })
    }

    pub fn committed(&self) -> &'a Node {
        self.node
    }

    pub fn update(&self) -> Option<&'a NodeUpdate> {
        self.update
    }

    pub fn trajectory(&self) -> &TrajectoryContainer {
        &self.trajectory
    }
}

impl NodeState for NodeView<'_> {
    fn spec(&self) -> &NodeSpecification {
        self.node.spec()
    }

    fn birth(&self) -> Time {
        self.trajectory.birth()
    }

    fn job_list(&self) -> Vec<Job> {
        let Some(update) = self.update else {
            return self.node.job_list();
        };
        let mut jobs: Vec<Job> = self
            .node
            .jobs()
            .filter(|j| !update.removes_job(j.id))
            .copied()
            .chain(update.job_additions().copied())
            .collect();
        jobs.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        jobs
    }

    fn location_at(&self, t: Time) -> Option<Point> {
        self.trajectory.location_at(t)
    }

    fn trajectory_slice(&self, from: Time, to: Time) -> Trajectory {
        self.trajectory.slice(from, to)
    }
}
