//! Fit one job into one idle slot of one node.

use tracing::trace;

use fl_arctime::{
    find_fixed_time, find_minimum_time, ArcTimeError, ArcTimeResult, FixedTimeQuery, MeshSettings, MinimumTimeQuery,
};
use fl_core::{JobId, NodeId, Point, Time, TimeBound};
use fl_node::{IdleSlot, Job, NodeState};
use fl_schedule::{Alternative, BranchId};
use fl_spatial::{SpatialError, SpatialResult, World};
use fl_trajectory::{SpatialPath, Trajectory};

use crate::{PlanError, PlanResult, PlanningContext};

/// One insertion attempt: put job `job` at `location` on `node` inside
/// `slot`, starting within `[earliest_start, latest_start]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Insertion {
    pub job: JobId,
    pub node: NodeId,
    pub location: Point,
    pub slot: IdleSlot,
    pub earliest_start: Time,
    pub latest_start: Time,
    pub duration: f64,
}

/// `Ok(None)` for the ordinary "cannot be done" outcome of a pathfinder.
pub(crate) fn feasible(result: ArcTimeResult<Trajectory>) -> PlanResult<Option<Trajectory>> {
    match result {
        Ok(t) => Ok(Some(t)),
        Err(ArcTimeError::Infeasible) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `Ok(None)` when the router finds no way between the two points.
pub(crate) fn routed(result: SpatialResult<SpatialPath>) -> PlanResult<Option<SpatialPath>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(SpatialError::NoRoute { .. } | SpatialError::Blocked(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Plan the approach, the job itself and the departure, and stage all of
/// them together with the new [`Job`] on `branch`.
///
/// The approach is a minimum-time traversal from the slot start that
/// arrives within the start window and can then stay put for the job's
/// duration.  The departure rejoins the slot end at exactly the slot's
/// finish time.  After an open-ended slot the node holds its position until
/// every other node and moving obstacle has come to rest, and a hold that
/// would be hit rejects the slot.
///
/// Nothing is staged unless every piece was found.
pub fn plan_insertion(
    ctx: &PlanningContext<'_>,
    alt: &mut Alternative,
    branch: BranchId,
    ins: &Insertion,
) -> PlanResult<Option<Job>> {
    if alt.job(branch, ins.job).is_some() {
        return Err(PlanError::DuplicateJob(ins.job));
    }
    let Some(pieces) = plan_pieces(ctx, alt, branch, ins)? else {
        return Ok(None);
    };
    let job = Job::new(ins.job, ins.node, ins.location, pieces.job_start, ins.duration)?;
    for piece in pieces.trajectories {
        alt.stage_trajectory(branch, ins.node, piece)?;
    }
    alt.add_job(branch, job)?;
    Ok(Some(job))
}

struct Pieces {
    job_start: Time,
    trajectories: Vec<Trajectory>,
}

fn plan_pieces(
    ctx: &PlanningContext<'_>,
    alt: &Alternative,
    branch: BranchId,
    ins: &Insertion,
) -> PlanResult<Option<Pieces>> {
    let schedule = ctx.schedule;
    let view = schedule.view(ins.node, Some((alt, branch)))?;
    let world: World = schedule.world().perceived_by(view.radius());
    if world.covers(ins.location) {
        return Ok(None);
    }

    let slot = &ins.slot;
    let earliest = ins.earliest_start.max(slot.start_time);
    let latest = match slot.finish_time {
        TimeBound::At(end) => ins.latest_start.min(end - ins.duration),
        TimeBound::PosInfinity => ins.latest_start,
        TimeBound::NegInfinity => return Ok(None),
    };
    if latest < earliest {
        return Ok(None);
    }

    let Some(approach_route) = routed(ctx.router.route(&world, slot.start_location, ins.location))? else {
        return Ok(None);
    };
    let departure_route = match slot.finish_location {
        Some(end) => match routed(ctx.router.route(&world, ins.location, end))? {
            Some(path) => Some(path),
            None => return Ok(None),
        },
        None => None,
    };

    // After an open-ended slot the node parks at the job location for good,
    // so the hold must last until everything around it has stopped moving.
    let window_end = match slot.finish_time {
        TimeBound::At(end) => end,
        _ => {
            let tail = view.trajectory().finish_time().unwrap_or(view.birth());
            let settled = schedule.last_activity(ins.node, Some((alt, branch)))?;
            (latest + ins.duration).max(tail).max(settled.unwrap_or(tail))
        }
    };
    let obstacles = schedule.obstacles_for(ins.node, slot.start_time, window_end, Some((alt, branch)))?;
    let settings = MeshSettings::from(ctx.config);
    let max_speed = view.max_speed();
    trace!(node = %ins.node, job = %ins.job, obstacles = obstacles.len(), "planning insertion");

    let approach = feasible(find_minimum_time(&MinimumTimeQuery {
        route: &approach_route,
        obstacles: &obstacles,
        max_speed,
        start_time: slot.start_time,
        earliest_finish_time: earliest,
        latest_finish_time: latest,
        buffer_duration: ins.duration,
        settings,
    }))?;
    let Some(approach) = approach else {
        return Ok(None);
    };
    let job_start = approach.finish_time().unwrap_or(slot.start_time);
    let job_finish = job_start + ins.duration;
    let stay = Trajectory::stationary(ins.location, job_start, job_finish)?;

    let departure = match (&departure_route, slot.finish_time) {
        (Some(route), TimeBound::At(end)) => feasible(find_fixed_time(&FixedTimeQuery {
            route,
            obstacles: &obstacles,
            max_speed,
            start_time: job_finish,
            finish_time: end,
            settings,
        }))?,
        (_, TimeBound::PosInfinity) if window_end > job_finish => feasible(find_fixed_time(&FixedTimeQuery {
            route: &SpatialPath::degenerate(ins.location),
            obstacles: &obstacles,
            max_speed,
            start_time: job_finish,
            finish_time: window_end,
            settings,
        }))?,
        _ => Some(Trajectory::empty()),
    };
    let Some(departure) = departure else {
        return Ok(None);
    };

    let trajectories = [approach, stay, departure].into_iter().filter(|t| t.duration() > 0.0).collect();
    Ok(Some(Pieces { job_start, trajectories }))
}
