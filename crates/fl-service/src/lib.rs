//! `fl-service` — the transaction facade of the rust_fleet job scheduler.
//!
//! # Transaction lifecycle
//!
//! ```text
//! schedule / schedule_dependent / schedule_periodic / unschedule / reschedule
//!   ① Plan     — a fresh Alternative is filled by the planners; infeasible
//!                requests return ServiceError::Infeasible and touch nothing.
//!   ② Propose  — the sealed Alternative is validated by the Schedule and its
//!                locks taken; the caller receives a TransactionOutcome.
//!   ③ Resolve  — commit / commit_node integrate staged changes,
//!                abort / abort_node discard them.  A transaction is
//!                forgotten once nothing of it is left outstanding.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Ranks planner candidates on Rayon's thread pool.       |
//! | `serde`    | Serde derives on configs, specifications and jobs.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fl_core::PlannerConfig;
//! use fl_service::{JobSchedulerBuilder, NoopObserver};
//! use fl_spatial::VisibilityRouter;
//!
//! let mut scheduler = JobSchedulerBuilder::new(PlannerConfig::default(), VisibilityRouter::default(), NoopObserver)
//!     .nodes(fleet)
//!     .build()?;
//! let outcome = scheduler.schedule(&spec)?;
//! scheduler.commit(outcome.id)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod outcome;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use builder::JobSchedulerBuilder;
pub use error::{ServiceError, ServiceResult};
pub use observer::{NoopObserver, TransactionObserver};
pub use outcome::TransactionOutcome;
pub use scheduler::JobScheduler;
