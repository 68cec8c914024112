//! `fl-trajectory` — paths, motion profiles and space-time curves.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                   |
//! |---------------------|------------------------------------------------------------|
//! | [`spatial_path`]    | `SpatialPath`, `PathSegment` — polylines with cached arcs  |
//! | [`arc_time_path`]   | `ArcTime`, `ArcTimePath` — causal motion profiles          |
//! | [`trajectory`]      | `Trajectory`, `TrajectorySegment` — direct or composed     |
//! | [`container`]       | `TrajectoryContainer` — one node's gap-free history        |
//! | [`obstacle`]        | `DynamicObstacle` — a convex footprint on a trajectory     |
//! | [`error`]           | `TrajectoryError`, `TrajectoryResult<T>`                   |
//!
//! # Composition
//!
//! The pathfinders never produce a spatial trajectory directly.  They pick a
//! route (`SpatialPath`) first and then a profile along it (`ArcTimePath`,
//! arc = distance travelled, time relative to a base).  `Trajectory::composite`
//! pairs the two; the vertex list is materialised on first use, inserting a
//! vertex wherever the profile crosses a route corner.

pub mod arc_time_path;
pub mod container;
pub mod error;
pub mod obstacle;
pub mod spatial_path;
pub mod trajectory;


pub use arc_time_path::{ArcTime, ArcTimePath};
pub use container::TrajectoryContainer;
pub use error::{TrajectoryError, TrajectoryResult};
pub use obstacle::DynamicObstacle;
pub use spatial_path::{PathSegment, SpatialPath};
pub use trajectory::{Trajectory, TrajectorySegment};
