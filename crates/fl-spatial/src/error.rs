//! Spatial-subsystem error type.

use thiserror::Error;

use fl_core::{CoreError, Point};
use fl_trajectory::TrajectoryError;

/// Errors produced by `fl-spatial`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: Point, to: Point },

    #[error("location {0} lies inside an obstacle")]
    Blocked(Point),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
