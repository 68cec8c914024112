//! `JobScheduler` — the transaction facade over the schedule and planners.

use rustc_hash::FxHashMap;
use tracing::debug;

use fl_core::{JobId, NodeId, PlannerConfig, SimRng, Time, TransactionId};
use fl_node::{Job, Node, NodeSpecification};
use fl_planner::{
    plan_removal, schedule_dependent, schedule_periodic, schedule_singular, DependencyGraph, JobSpecification,
    PeriodicJobSpecification, PlanResult, PlanningContext,
};
use fl_schedule::{Alternative, AlternativeId, Schedule};
use fl_spatial::Router;

use crate::{ServiceError, ServiceResult, TransactionObserver, TransactionOutcome};

/// Plans job changes as transactions and commits or aborts them on request.
///
/// Each request builds one [`Alternative`], fills it through the planners,
/// and offers it to the [`Schedule`], which validates it and locks what it
/// touches.  The caller gets back a [`TransactionOutcome`]; committed state
/// only changes on [`commit`](Self::commit) or
/// [`commit_node`](Self::commit_node).
///
/// Construct with [`JobSchedulerBuilder`](crate::JobSchedulerBuilder).
pub struct JobScheduler<R: Router, O: TransactionObserver> {
    pub(crate) config: PlannerConfig,
    pub(crate) schedule: Schedule,
    pub(crate) router: R,
    pub(crate) observer: O,
    pub(crate) rng: SimRng,
    pub(crate) transactions: FxHashMap<TransactionId, AlternativeId>,
}

impl<R: Router, O: TransactionObserver> JobScheduler<R, O> {
    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The underlying schedule, committed state and pending locks.
    pub fn state(&self) -> &Schedule {
        &self.schedule
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.schedule.node(id)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.schedule.job(id)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Transactions proposed but not yet fully committed or aborted.
    pub fn pending_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_pending(&self, id: TransactionId) -> bool {
        self.transactions.contains_key(&id)
    }

    // ── Planning requests ─────────────────────────────────────────────────

    /// Place one job.
    pub fn schedule(&mut self, spec: &JobSpecification) -> ServiceResult<TransactionOutcome> {
        let what = format!("job {}", spec.id);
        self.propose(&what, |ctx, rng, alt| {
            schedule_singular(ctx, rng, alt, Alternative::ROOT, spec).map(|job| job.map(|_| ()))
        })
    }

    /// Place a batch of jobs in dependency order, all or nothing.
    pub fn schedule_dependent(
        &mut self,
        specs: &[JobSpecification],
        graph: &DependencyGraph,
    ) -> ServiceResult<TransactionOutcome> {
        let what = format!("{} dependent jobs", specs.len());
        self.propose(&what, |ctx, rng, alt| {
            schedule_dependent(ctx, rng, alt, Alternative::ROOT, specs, graph).map(|jobs| jobs.map(|_| ()))
        })
    }

    /// Place every repetition of a periodic job, all or nothing.
    pub fn schedule_periodic(&mut self, spec: &PeriodicJobSpecification) -> ServiceResult<TransactionOutcome> {
        let what = format!("periodic job of {} repetitions", spec.len());
        self.propose(&what, |ctx, rng, alt| {
            schedule_periodic(ctx, rng, alt, Alternative::ROOT, spec).map(|jobs| jobs.map(|_| ()))
        })
    }

    /// Take a committed job out of its node's plan.
    pub fn unschedule(&mut self, id: JobId) -> ServiceResult<TransactionOutcome> {
        let what = format!("removal of job {id}");
        self.propose(&what, |ctx, _, alt| plan_removal(ctx, alt, Alternative::ROOT, id).map(|_| Some(())))
    }

    /// Replace the committed job `spec.id` with a fresh placement of `spec`,
    /// in one transaction.
    pub fn reschedule(&mut self, spec: &JobSpecification) -> ServiceResult<TransactionOutcome> {
        let what = format!("rescheduled job {}", spec.id);
        self.propose(&what, |ctx, rng, alt| {
            plan_removal(ctx, alt, Alternative::ROOT, spec.id)?;
            schedule_singular(ctx, rng, alt, Alternative::ROOT, spec).map(|job| job.map(|_| ()))
        })
    }

    /// Run `plan` against a fresh alternative and offer the result to the
    /// schedule.
    fn propose<F>(&mut self, what: &str, plan: F) -> ServiceResult<TransactionOutcome>
    where
        F: FnOnce(&PlanningContext<'_>, &mut SimRng, &mut Alternative) -> PlanResult<Option<()>>,
    {
        let mut alt = Alternative::new();
        let planned = {
            let ctx = PlanningContext::new(&self.schedule, &self.router, &self.config);
            plan(&ctx, &mut self.rng, &mut alt)?
        };
        if planned.is_none() {
            debug!(what, "request infeasible");
            return Err(ServiceError::Infeasible(what.to_owned()));
        }

        alt.seal()?;
        let id = TransactionId::new_random();
        let outcome = TransactionOutcome::of(id, &alt);
        let alternative = self.schedule.add_alternative(alt)?;
        self.transactions.insert(id, alternative);
        debug!(%id, %alternative, what, "transaction proposed");
        self.observer.on_proposed(&outcome);
        Ok(outcome)
    }

    // ── Transaction resolution ────────────────────────────────────────────

    fn alternative_of(&self, id: TransactionId) -> ServiceResult<AlternativeId> {
        self.transactions.get(&id).copied().ok_or(ServiceError::UnknownTransaction(id))
    }

    /// Forget `id` once its alternative has nothing left outstanding.
    fn settle(&mut self, id: TransactionId, alternative: AlternativeId) {
        if self.schedule.alternative(alternative).is_none() {
            self.transactions.remove(&id);
        }
    }

    /// Integrate everything the transaction staged.
    pub fn commit(&mut self, id: TransactionId) -> ServiceResult<()> {
        let alternative = self.alternative_of(id)?;
        self.schedule.integrate(alternative)?;
        self.transactions.remove(&id);
        debug!(%id, "transaction committed");
        self.observer.on_committed(id, None);
        Ok(())
    }

    /// Integrate one node's part of the transaction.
    pub fn commit_node(&mut self, id: TransactionId, node: NodeId) -> ServiceResult<()> {
        let alternative = self.alternative_of(id)?;
        self.schedule.integrate_node(alternative, node)?;
        self.settle(id, alternative);
        debug!(%id, %node, "node committed");
        self.observer.on_committed(id, Some(node));
        Ok(())
    }

    /// Discard everything the transaction staged.
    pub fn abort(&mut self, id: TransactionId) -> ServiceResult<()> {
        let alternative = self.alternative_of(id)?;
        self.schedule.eliminate(alternative)?;
        self.transactions.remove(&id);
        debug!(%id, "transaction aborted");
        self.observer.on_aborted(id, None);
        Ok(())
    }

    /// Discard one node's part of the transaction.
    pub fn abort_node(&mut self, id: TransactionId, node: NodeId) -> ServiceResult<()> {
        let alternative = self.alternative_of(id)?;
        self.schedule.eliminate_node(alternative, node)?;
        self.settle(id, alternative);
        debug!(%id, %node, "node aborted");
        self.observer.on_aborted(id, Some(node));
        Ok(())
    }

    // ── Direct schedule edits ─────────────────────────────────────────────

    pub fn add_node(&mut self, spec: NodeSpecification) -> ServiceResult<&Node> {
        Ok(self.schedule.add_node(spec)?)
    }

    /// Remove a node that has no jobs and no pending transaction.
    pub fn remove_node(&mut self, id: NodeId) -> ServiceResult<Node> {
        Ok(self.schedule.remove_node(id)?)
    }

    /// Drop a committed job without re-planning its node's trajectory.
    /// Fails while a pending transaction is removing the same job.
    pub fn remove_job(&mut self, id: JobId) -> ServiceResult<Job> {
        Ok(self.schedule.remove_job(id)?)
    }

    pub fn set_frozen_horizon(&mut self, t: Time) -> ServiceResult<()> {
        Ok(self.schedule.set_frozen_horizon(t)?)
    }

    /// Forget committed history before `present`, bounded by the frozen
    /// horizon.  Returns the number of jobs dropped.
    pub fn clean_up(&mut self, present: Time) -> usize {
        self.schedule.clean_up(present)
    }
}
