//! `fl-core` — foundational types for the `rust_fleet` job scheduler.
//!
//! This crate is a dependency of every other `fl-*` crate.  It intentionally
//! has no `fl-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `uuid`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `JobId`, `TransactionId`                    |
//! | [`time`]        | `Time`, `TimeBound`                                   |
//! | [`geo`]         | `Point`, `Vector`, `Envelope`, `ConvexPolygon`        |
//! | [`interval`]    | `IntervalSet<T>`                                      |
//! | [`rng`]         | `SimRng`                                              |
//! | [`config`]      | `PlannerConfig`                                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod interval;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PlannerConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{ConvexPolygon, Envelope, Point, Vector, EPSILON};
pub use ids::{JobId, NodeId, TransactionId};
pub use interval::IntervalSet;
pub use rng::SimRng;
pub use time::{Time, TimeBound};
