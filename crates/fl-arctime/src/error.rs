//! Arc-time planning error type.

use thiserror::Error;

use fl_core::CoreError;
use fl_trajectory::TrajectoryError;

/// Errors produced by `fl-arctime`.
///
/// [`ArcTimeError::Infeasible`] is the ordinary "no collision-free profile
/// exists" outcome; every other variant is a malformed query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArcTimeError {
    #[error("no collision-free motion profile exists")]
    Infeasible,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ArcTimeResult<T> = Result<T, ArcTimeError>;
