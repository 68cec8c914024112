//! Place a periodically repeated job.

use tracing::debug;

use fl_core::SimRng;
use fl_node::Job;
use fl_schedule::{Alternative, BranchId};

use crate::{in_sub_branch, schedule_singular, PeriodicJobSpecification, PlanResult, PlanningContext};

/// Schedule every repetition of `spec`, or none of them.
///
/// With `same_location` one location is sampled per attempt and shared by
/// all repetitions; a failed attempt is rolled back and the next sample
/// tried, up to `max_location_picks`.  Otherwise each repetition samples
/// its own location and a single attempt is made.
pub fn schedule_periodic(
    ctx: &PlanningContext<'_>,
    rng: &mut SimRng,
    alt: &mut Alternative,
    branch: BranchId,
    spec: &PeriodicJobSpecification,
) -> PlanResult<Option<Vec<Job>>> {
    spec.validate()?;
    for id in &spec.ids {
        ctx.ensure_unclaimed(alt, branch, *id)?;
    }

    if !spec.same_location {
        return in_sub_branch(alt, branch, |alt, sub| place_all(ctx, rng, alt, sub, spec));
    }
    let picks = spec.location.candidates(rng, ctx.config.max_location_picks);
    for location in picks {
        let pinned = spec.at(location);
        if let Some(jobs) = in_sub_branch(alt, branch, |alt, sub| place_all(ctx, rng, alt, sub, &pinned))? {
            return Ok(Some(jobs));
        }
        debug!(%location, "periodic series does not fit, trying another location");
    }
    Ok(None)
}

fn place_all(
    ctx: &PlanningContext<'_>,
    rng: &mut SimRng,
    alt: &mut Alternative,
    branch: BranchId,
    spec: &PeriodicJobSpecification,
) -> PlanResult<Option<Vec<Job>>> {
    let mut jobs = Vec::with_capacity(spec.len());
    for repetition in spec.repetitions() {
        match schedule_singular(ctx, rng, alt, branch, &repetition)? {
            Some(job) => jobs.push(job),
            None => return Ok(None),
        }
    }
    Ok(Some(jobs))
}
