//! Take one committed job back out of a node's plan.

use tracing::trace;

use fl_arctime::{find_fixed_time, FixedTimeQuery, MeshSettings};
use fl_core::{JobId, TimeBound};
use fl_node::{Job, NodeState};
use fl_schedule::{Alternative, BranchId, ScheduleError};
use fl_trajectory::Trajectory;

use crate::insertion::{feasible, routed};
use crate::{PlanError, PlanResult, PlanningContext};

/// Stage the removal of committed job `id` and a new trajectory across the
/// idle window it leaves behind.
///
/// With nothing after the job the node simply stays where the job was.
/// Otherwise the window from the preceding idle boundary to the next job is
/// re-planned as a single fixed-time traversal; when none exists the old
/// trajectory is kept and only the job is dropped.
///
/// Returns the removed job.
pub fn plan_removal(
    ctx: &PlanningContext<'_>,
    alt: &mut Alternative,
    branch: BranchId,
    id: JobId,
) -> PlanResult<Job> {
    let schedule = ctx.schedule;
    let job = *schedule.job(id).ok_or(PlanError::UnknownJob(id))?;
    if alt.update(branch, job.node).is_some_and(|u| u.removes_job(id)) {
        return Err(PlanError::UnknownJob(id));
    }
    let horizon = schedule.frozen_horizon();
    if horizon > job.start_time {
        return Err(PlanError::Frozen { job: id, start: job.start_time, horizon });
    }
    let node = schedule.node(job.node).ok_or(ScheduleError::UnknownNode(job.node))?;
    if node.is_removal_locked(id) {
        return Err(ScheduleError::RemovalLocked(id).into());
    }

    let piece = reconnect(ctx, alt, branch, &job)?;
    if let Some(piece) = piece.filter(|p| p.duration() > 0.0) {
        alt.stage_trajectory(branch, job.node, piece)?;
    }
    alt.remove_job(branch, job)?;
    Ok(job)
}

fn reconnect(
    ctx: &PlanningContext<'_>,
    alt: &Alternative,
    branch: BranchId,
    job: &Job,
) -> PlanResult<Option<Trajectory>> {
    let schedule = ctx.schedule;
    let view = schedule.view(job.node, Some((alt, branch)))?;
    let ceiling = view.ceiling_idle_time(job.finish_time());

    let Some(TimeBound::At(end)) = ceiling else {
        return Ok(Some(Trajectory::stationary(job.location, job.start_time, job.finish_time())?));
    };
    let Some(floor) = view.floor_idle_time(job.start_time) else {
        return Ok(None);
    };
    let floor = ctx.plannable_from(floor);
    let (Some(from), Some(to)) = (view.location_at(floor), view.location_at(end)) else {
        return Ok(None);
    };

    let world = schedule.world().perceived_by(view.radius());
    let Some(route) = routed(ctx.router.route(&world, from, to))? else {
        return Ok(None);
    };
    let obstacles = schedule.obstacles_for(job.node, floor, end, Some((alt, branch)))?;
    trace!(job = %job.id, from = %floor, to = %end, "re-planning reclaimed window");
    feasible(find_fixed_time(&FixedTimeQuery {
        route: &route,
        obstacles: &obstacles,
        max_speed: view.max_speed(),
        start_time: floor,
        finish_time: end,
        settings: MeshSettings::from(ctx.config),
    }))
}
