//! `fl-planner` — turns job requests into staged changes on an alternative.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`spec`]       | `LocationSpace`, `JobSpecification`, `PeriodicJobSpecification` |
//! | [`dependency`] | `DependencyGraph`, `normalize_dependencies`                   |
//! | [`context`]    | `PlanningContext`, `in_sub_branch`                            |
//! | [`insertion`]  | `plan_insertion` — one job into one idle slot                 |
//! | [`removal`]    | `plan_removal` — one job out, window re-planned               |
//! | [`singular`]   | `schedule_singular` — candidate locations × ranked slots      |
//! | [`dependent`]  | `schedule_dependent` — a batch in dependency order            |
//! | [`periodic`]   | `schedule_periodic` — a repeated job, all or nothing          |
//! | [`error`]      | `PlanError`, `PlanResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Rank (node, slot) candidates on Rayon's thread pool.        |
//!
//! Planners never touch the [`Schedule`](fl_schedule::Schedule): they read
//! it through a [`PlanningContext`] and stage everything on one branch of an
//! [`Alternative`](fl_schedule::Alternative).  Failing to find a plan is
//! `Ok(None)`; `Err` is reserved for malformed requests.

pub mod context;
pub mod dependency;
pub mod dependent;
pub mod error;
pub mod insertion;
pub mod periodic;
pub mod removal;
pub mod singular;
pub mod spec;


pub use context::{in_sub_branch, PlanningContext};
pub use dependency::{normalize_dependencies, DependencyGraph};
pub use dependent::schedule_dependent;
pub use error::{PlanError, PlanResult};
pub use insertion::{plan_insertion, Insertion};
pub use periodic::schedule_periodic;
pub use removal::plan_removal;
pub use singular::{rank_candidates, schedule_singular, Candidate};
pub use spec::{JobSpecification, LocationSpace, PeriodicJobSpecification};
