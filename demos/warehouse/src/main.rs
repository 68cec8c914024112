//! warehouse — a small fleet of floor robots taking pick jobs.
//!
//! Three robots share a 30 m × 20 m floor split by two shelving rows.
//! Picks are scheduled one by one, a pick/drop pair as a dependent batch,
//! and a shelf inspection as a periodic job somewhere along an aisle.
//! Every proposal is committed straight away except one that is aborted to
//! show the lock release, and one pick is withdrawn again at the end.
//!
//! Set `RUST_LOG=debug` to follow every transaction.

use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fl_core::{ConvexPolygon, JobId, NodeId, PlannerConfig, Point, Time, TransactionId};
use fl_node::{NodeSpecification, NodeState};
use fl_planner::{DependencyGraph, JobSpecification, LocationSpace, PeriodicJobSpecification};
use fl_service::{
    JobScheduler, JobSchedulerBuilder, ServiceError, ServiceResult, TransactionObserver, TransactionOutcome,
};
use fl_spatial::{Router, VisibilityRouter, WorldBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:         u64 = 42;
const ROBOT_SPEED:  f64 = 1.5; // m/s
const ROBOT_RADIUS: f64 = 0.4; // m, half the footprint edge
const PICK_SECS:    f64 = 20.0;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    proposed:  usize,
    committed: usize,
    aborted:   usize,
}

impl TransactionObserver for Tally {
    fn on_proposed(&mut self, outcome: &TransactionOutcome) {
        self.proposed += 1;
        info!(id = %outcome.id, jobs = outcome.job_additions.len(), nodes = ?outcome.nodes(), "proposed");
    }

    fn on_committed(&mut self, _id: TransactionId, _node: Option<NodeId>) {
        self.committed += 1;
    }

    fn on_aborted(&mut self, _id: TransactionId, _node: Option<NodeId>) {
        self.aborted += 1;
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn robot(id: u32, x: f64, y: f64) -> Result<NodeSpecification> {
    Ok(NodeSpecification {
        id:               NodeId(id),
        shape:            ConvexPolygon::square(Point::default(), ROBOT_RADIUS)?,
        max_speed:        ROBOT_SPEED,
        initial_location: Point::new(x, y),
        initial_time:     Time(0.0),
    })
}

fn pick(id: u64, x: f64, y: f64, earliest: f64, latest: f64) -> JobSpecification {
    JobSpecification {
        id:             JobId(id),
        location:       LocationSpace::Point(Point::new(x, y)),
        earliest_start: Time(earliest),
        latest_start:   Time(latest),
        duration:       PICK_SECS,
    }
}

/// Commit the proposal, or report why there was none.
fn commit<R: Router>(
    scheduler: &mut JobScheduler<R, Tally>,
    what: &str,
    proposal: ServiceResult<TransactionOutcome>,
) -> Result<()> {
    match proposal {
        Ok(outcome) => {
            scheduler.commit(outcome.id)?;
            info!(what, jobs = outcome.job_additions.len(), removed = outcome.job_removals.len(), "committed");
            Ok(())
        }
        Err(ServiceError::Infeasible(reason)) => {
            warn!(what, reason, "no placement");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Floor plan: two shelving rows with aisles at both ends.
    let mut floor = WorldBuilder::new();
    floor
        .add_obstacle(ConvexPolygon::rectangle(Point::new(5.0, 6.0), Point::new(25.0, 8.0))?)
        .add_obstacle(ConvexPolygon::rectangle(Point::new(5.0, 12.0), Point::new(25.0, 14.0))?);
    let world = floor.build();
    info!(shelves = world.len(), "floor plan ready");

    // 2. Scheduler with three robots parked along the south wall.
    let config = PlannerConfig { seed: SEED, ..PlannerConfig::default() };
    let fleet = vec![robot(1, 2.0, 2.0)?, robot(2, 15.0, 2.0)?, robot(3, 28.0, 2.0)?];
    let mut scheduler = JobSchedulerBuilder::new(config, VisibilityRouter::default(), Tally::default())
        .world(world)
        .nodes(fleet)
        .build()?;

    let t0 = Instant::now();

    // 3. Single picks in the aisles.
    let picks = [
        pick(1, 10.0, 10.0, 0.0, 60.0),
        pick(2, 20.0, 10.0, 0.0, 60.0),
        pick(3, 15.0, 16.0, 30.0, 120.0),
        pick(4, 3.0, 17.0, 60.0, 200.0),
    ];
    for spec in &picks {
        let proposal = scheduler.schedule(spec);
        commit(&mut scheduler, &format!("pick {}", spec.id), proposal)?;
    }

    // 4. A pick and the drop-off that has to follow it.
    let batch = vec![pick(10, 27.0, 10.0, 0.0, 300.0), pick(11, 15.0, 1.0, 0.0, 400.0)];
    let graph: DependencyGraph = [(JobId(11), JobId(10))].into_iter().collect();
    let proposal = scheduler.schedule_dependent(&batch, &graph);
    commit(&mut scheduler, "pick and drop", proposal)?;

    // 5. Shelf inspection every ten minutes, always at the same spot.
    let inspection = PeriodicJobSpecification {
        ids:            vec![JobId(20), JobId(21), JobId(22)],
        location:       LocationSpace::Region(ConvexPolygon::rectangle(Point::new(6.0, 9.0), Point::new(24.0, 11.0))?),
        earliest_start: Time(200.0),
        latest_start:   Time(320.0),
        duration:       30.0,
        period:         600.0,
        same_location:  true,
    };
    let proposal = scheduler.schedule_periodic(&inspection);
    commit(&mut scheduler, "inspection", proposal)?;

    // 6. A proposal that is thought better of.
    if let Ok(outcome) = scheduler.schedule(&pick(30, 28.0, 18.0, 0.0, 900.0)) {
        scheduler.abort(outcome.id)?;
        info!(id = %outcome.id, "aborted");
    }

    // 7. Pick 4 is no longer needed.
    let proposal = scheduler.unschedule(JobId(4));
    commit(&mut scheduler, "withdraw pick 4", proposal)?;

    let elapsed = t0.elapsed();
    let tally = scheduler.observer();
    info!(
        proposed = tally.proposed,
        committed = tally.committed,
        aborted = tally.aborted,
        secs = elapsed.as_secs_f64(),
        "planning complete"
    );

    // 8. Final job table.
    println!();
    println!("{:<8} {:<8} {:>16} {:>10} {:>10}", "Job", "Robot", "Location", "Start", "Finish");
    println!("{}", "-".repeat(56));
    for node in scheduler.state().nodes() {
        for job in node.jobs() {
            println!(
                "{:<8} {:<8} {:>16} {:>10} {:>10}",
                job.id.to_string(),
                job.node.to_string(),
                format!("({:.1}, {:.1})", job.location.x, job.location.y),
                format!("{:.1}", job.start_time.secs()),
                format!("{:.1}", job.finish_time().secs()),
            );
        }
        if let Some(end) = node.trajectory().finish_time() {
            let parked = node.location_at(end);
            info!(node = %node.id(), jobs = node.job_count(), until = %end, ?parked, "robot plan");
        }
    }

    Ok(())
}
