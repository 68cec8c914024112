//! Place a batch of jobs that must run in dependency order.

use std::collections::BTreeMap;

use tracing::debug;

use fl_core::{JobId, SimRng};
use fl_node::Job;
use fl_schedule::{Alternative, BranchId};

use crate::{
    in_sub_branch, normalize_dependencies, schedule_singular, DependencyGraph, JobSpecification, PlanResult,
    PlanningContext,
};

/// Schedule every job of `specs`, each starting at least
/// `dependency_margin` seconds after all of its dependencies have finished.
///
/// Jobs are placed one at a time in dependency order inside a child of
/// `branch`.  There is no backtracking: the first job that cannot be placed
/// discards the whole batch and leaves `branch` as it was.
pub fn schedule_dependent(
    ctx: &PlanningContext<'_>,
    rng: &mut SimRng,
    alt: &mut Alternative,
    branch: BranchId,
    specs: &[JobSpecification],
    graph: &DependencyGraph,
) -> PlanResult<Option<Vec<Job>>> {
    let margin = ctx.config.dependency_margin;
    let Some(ordered) = normalize_dependencies(specs, graph, margin)? else {
        debug!(jobs = specs.len(), "dependencies admit no schedule");
        return Ok(None);
    };
    for spec in &ordered {
        ctx.ensure_unclaimed(alt, branch, spec.id)?;
    }

    in_sub_branch(alt, branch, |alt, sub| {
        let mut placed: BTreeMap<JobId, Job> = BTreeMap::new();
        for spec in &ordered {
            let ready = graph
                .dependencies_of(spec.id)
                .filter_map(|dep| placed.get(&dep))
                .map(|dep| dep.finish_time() + margin)
                .max();
            let mut spec = spec.clone();
            if let Some(t) = ready {
                spec.earliest_start = spec.earliest_start.max(t);
            }
            if spec.latest_start < spec.earliest_start {
                debug!(job = %spec.id, "dependencies finish too late");
                return Ok(None);
            }
            let Some(job) = schedule_singular(ctx, rng, alt, sub, &spec)? else {
                return Ok(None);
            };
            placed.insert(job.id, job);
        }
        Ok(Some(ordered.iter().filter_map(|s| placed.get(&s.id).copied()).collect()))
    })
}
