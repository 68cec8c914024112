//! `fl-arctime` — collision-free motion along a fixed route.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                       |
//! |-----------------|----------------------------------------------------------------|
//! | [`region`]      | `ForbiddenRegion`, `build_forbidden_regions`                   |
//! | [`checker`]     | `EdgeChecker` + bounds / speed / visibility / buffer checkers  |
//! | [`mesh`]        | `ArcTimeMesh` (CSR), `MeshBuilder`, simple and lazy connection |
//! | [`search`]      | Dijkstra with hop tie-break, forward and reverse reachability  |
//! | [`pathfinder`]  | `find_fixed_time`, `find_minimum_time` and their queries       |
//! | [`error`]       | `ArcTimeError`, `ArcTimeResult<T>`                             |
//!
//! # Planning model
//!
//! Route choice and timing are separate.  Given a route, a profile is a
//! polyline in the `(arc, time)` plane; moving obstacles become forbidden
//! regions in that plane, and a profile is collision-free exactly when it
//! avoids their interiors.  The speed limit bounds each edge's slope.

pub mod checker;
pub mod error;
pub mod mesh;
pub mod pathfinder;
pub mod region;
pub mod search;

#[cfg(test)]
mod tests;

pub use checker::{AllOf, BoundsChecker, BufferChecker, EdgeChecker, SpeedChecker, VisibilityChecker};
pub use error::{ArcTimeError, ArcTimeResult};
pub use mesh::{connect_lazy, connect_simple, ArcTimeMesh, LazyRays, MeshBuilder, VertexId};
pub use pathfinder::{find_fixed_time, find_minimum_time, FixedTimeQuery, MeshSettings, MinimumTimeQuery};
pub use region::{build_forbidden_regions, ForbiddenRegion};
pub use search::{reachable_from, reverse_reachable, shortest_path};
