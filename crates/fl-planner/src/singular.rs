//! Place one job anywhere it fits.

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use fl_core::{NodeId, Point, SimRng, TimeBound};
use fl_node::{IdleSlot, Job, Node, NodeState};
use fl_schedule::{Alternative, BranchId};

use crate::{plan_insertion, Insertion, JobSpecification, PlanResult, PlanningContext};

/// A (node, idle slot) pair worth trying for one location.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub node: NodeId,
    pub slot: IdleSlot,
    /// Extra distance the node travels to visit the location within the slot.
    pub detour: f64,
}

/// Schedule `spec` on whichever node and slot admit it, staging the result
/// on `branch`.
///
/// Candidate locations are the point itself or up to
/// `max_location_picks` samples of the region.  For each location the
/// (node, slot) pairs are tried in order of least detour until one
/// insertion succeeds.  Returns `Ok(None)` once every candidate is
/// exhausted.
pub fn schedule_singular(
    ctx: &PlanningContext<'_>,
    rng: &mut SimRng,
    alt: &mut Alternative,
    branch: BranchId,
    spec: &JobSpecification,
) -> PlanResult<Option<Job>> {
    spec.validate()?;
    ctx.ensure_unclaimed(alt, branch, spec.id)?;

    for location in spec.location.candidates(rng, ctx.config.max_location_picks) {
        for c in rank_candidates(ctx, alt, branch, spec, location)? {
            let ins = Insertion {
                job: spec.id,
                node: c.node,
                location,
                slot: c.slot,
                earliest_start: spec.earliest_start,
                latest_start: spec.latest_start,
                duration: spec.duration,
            };
            if let Some(job) = plan_insertion(ctx, alt, branch, &ins)? {
                debug!(job = %job.id, node = %job.node, start = %job.start_time, "job placed");
                return Ok(Some(job));
            }
        }
    }
    debug!(job = %spec.id, "no feasible placement");
    Ok(None)
}

/// Every (node, slot) pair that could hold `spec` at `location`, least
/// detour first.  Nodes whose perceived world covers the location are
/// skipped.
pub fn rank_candidates(
    ctx: &PlanningContext<'_>,
    alt: &Alternative,
    branch: BranchId,
    spec: &JobSpecification,
    location: Point,
) -> PlanResult<Vec<Candidate>> {
    let nodes: Vec<&Node> = ctx.schedule.nodes().collect();

    #[cfg(not(feature = "parallel"))]
    let per_node: Vec<Vec<Candidate>> = nodes
        .iter()
        .map(|node| candidates_on(ctx, alt, branch, node, spec, location))
        .collect::<PlanResult<_>>()?;

    #[cfg(feature = "parallel")]
    let per_node: Vec<Vec<Candidate>> = nodes
        .par_iter()
        .map(|node| candidates_on(ctx, alt, branch, node, spec, location))
        .collect::<PlanResult<_>>()?;

    let mut ranked: Vec<Candidate> = per_node.into_iter().flatten().collect();
    ranked.sort_by(|a, b| {
        a.detour
            .total_cmp(&b.detour)
            .then(a.node.cmp(&b.node))
            .then(a.slot.start_time.cmp(&b.slot.start_time))
    });
    Ok(ranked)
}

fn candidates_on(
    ctx: &PlanningContext<'_>,
    alt: &Alternative,
    branch: BranchId,
    node: &Node,
    spec: &JobSpecification,
    location: Point,
) -> PlanResult<Vec<Candidate>> {
    if node.perceived_world(ctx.schedule.world()).covers(location) {
        return Ok(Vec::new());
    }
    let view = ctx.schedule.view(node.id(), Some((alt, branch)))?;
    let from = ctx.plannable_from(view.birth());
    let earliest_finish = TimeBound::At(spec.earliest_start.max(from) + spec.duration);

    Ok(view
        .idle_slots(from, TimeBound::PosInfinity)
        .into_iter()
        .filter(|slot| slot.start_time <= spec.latest_start && slot.finish_time >= earliest_finish)
        .filter(|slot| slot.duration() >= spec.duration)
        .map(|slot| Candidate { node: node.id(), slot, detour: detour(&slot, location) })
        .collect())
}

fn detour(slot: &IdleSlot, location: Point) -> f64 {
    let there = slot.start_location.distance(location);
    match slot.finish_location {
        Some(end) => there + location.distance(end) - slot.start_location.distance(end),
        None => there,
    }
}
