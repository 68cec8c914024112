//! `fl-node` — the per-node model the schedule commits into.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`spec`]    | `NodeSpecification` — shape, speed limit, birth place/time    |
//! | [`job`]     | `Job` — a located, time-boxed unit of work                    |
//! | [`state`]   | `NodeState` trait, `IdleSlot` — idle-interval queries         |
//! | [`node`]    | `Node` — committed jobs, trajectory history, locks            |
//! | [`error`]   | `NodeError`, `NodeResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                         |
//! |---------|----------------------------------------------------------------|
//! | `serde` | Derives on `NodeSpecification`, `Job` and `IdleSlot`.          |
//!
//! Idle-slot arithmetic lives on the [`NodeState`] trait so that a committed
//! [`Node`] and a node overlaid with staged, uncommitted changes answer the
//! same questions the same way.

pub mod error;
pub mod job;
pub mod node;
pub mod spec;
pub mod state;


pub use error::{NodeError, NodeResult};
pub use job::Job;
pub use node::Node;
pub use spec::NodeSpecification;
pub use state::{IdleSlot, NodeState};
