//! Read-only planning state shared by every planner call.

use fl_core::{JobId, PlannerConfig, Time};
use fl_schedule::{Alternative, BranchId, Schedule};
use fl_spatial::Router;

use crate::{PlanError, PlanResult};

/// Everything a planner reads but never writes.
///
/// Planners stage their results into an [`Alternative`] passed alongside;
/// the schedule itself is only changed later, when the alternative is
/// offered and integrated.  The RNG is passed separately so a context can
/// be shared across Rayon workers.
#[derive(Copy, Clone)]
pub struct PlanningContext<'a> {
    pub schedule: &'a Schedule,
    pub router: &'a dyn Router,
    pub config: &'a PlannerConfig,
}

impl<'a> PlanningContext<'a> {
    pub fn new(schedule: &'a Schedule, router: &'a dyn Router, config: &'a PlannerConfig) -> Self {
        Self { schedule, router, config }
    }

    /// First instant a plan may change for a node born at `birth`.
    pub fn plannable_from(&self, birth: Time) -> Time {
        self.schedule.frozen_horizon().finite().map_or(birth, |h| h.max(birth))
    }

    /// Fail if `id` is committed and not being removed on `branch`, or
    /// already staged for addition there.
    pub fn ensure_unclaimed(&self, alt: &Alternative, branch: BranchId, id: JobId) -> PlanResult<()> {
        if alt.job(branch, id).is_some() {
            return Err(PlanError::DuplicateJob(id));
        }
        if let Some(job) = self.schedule.job(id) {
            let removed = alt.update(branch, job.node).is_some_and(|u| u.removes_job(id));
            if !removed {
                return Err(PlanError::DuplicateJob(id));
            }
        }
        Ok(())
    }
}

/// Run `f` on a fresh child of `parent`.  The child is merged back when `f`
/// returns `Some` and deleted otherwise, leaving `parent` untouched.
pub fn in_sub_branch<T, F>(alt: &mut Alternative, parent: BranchId, f: F) -> PlanResult<Option<T>>
where
    F: FnOnce(&mut Alternative, BranchId) -> PlanResult<Option<T>>,
{
    let child = alt.branch(parent)?;
    match f(alt, child) {
        Ok(Some(value)) => {
            alt.merge(child)?;
            Ok(Some(value))
        }
        Ok(None) => {
            alt.delete(child)?;
            Ok(None)
        }
        Err(e) => {
            // The planner error is the one worth reporting.
            alt.delete(child).ok();
            Err(e)
        }
    }
}
