//! `fl-schedule` — speculative changes and the schedule that commits them.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`update`]      | `NodeUpdate`, `Tolerance` — one node's staged diff            |
//! | [`view`]        | `NodeView` — committed node with a staged diff overlaid       |
//! | [`alternative`] | `Alternative`, `BranchId` — branchable bundle of diffs        |
//! | [`schedule`]    | `Schedule`, `AlternativeId` — validation, locks, integration  |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                          |
//!
//! # Life of an alternative
//!
//! ```text
//! Alternative::new ─► stage / branch / merge / delete ─► seal
//!        ─► Schedule::add_alternative  (validate everything, then lock)
//!        ─► integrate | eliminate      (whole, or one node at a time)
//! ```
//!
//! Accepted alternatives hold trajectory-time locks on every node they
//! touch, removal locks on the jobs they remove, and id locks on the jobs
//! they add.  A later alternative that collides with any of these is
//! rejected at `add_alternative`; nothing ever waits.

pub mod alternative;
pub mod error;
pub mod schedule;
pub mod update;
pub mod view;

#[cfg(test)]
mod tests;

pub use alternative::{Alternative, BranchId};
pub use error::{ScheduleError, ScheduleResult};
pub use schedule::{AlternativeId, Schedule};
pub use update::{NodeUpdate, Tolerance};
pub use view::NodeView;
