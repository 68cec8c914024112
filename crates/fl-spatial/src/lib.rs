//! `fl-spatial` — static obstacles, spatial indexing, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`world`]   | `World` (convex obstacles + R-tree), `WorldBuilder`         |
//! | [`router`]  | `Router` trait, `VisibilityRouter`                          |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |

pub mod error;
pub mod router;
pub mod world;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use router::{Router, VisibilityRouter};
pub use world::{World, WorldBuilder};
