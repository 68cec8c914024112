//! Planner error type.

use thiserror::Error;

use fl_arctime::ArcTimeError;
use fl_core::{CoreError, JobId, Time, TimeBound};
use fl_node::NodeError;
use fl_schedule::ScheduleError;
use fl_spatial::SpatialError;
use fl_trajectory::TrajectoryError;

/// Errors produced by `fl-planner`.
///
/// Every variant is a contract violation.  Running out of candidates is not
/// an error: planners report it as `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("invalid job specification: {0}")]
    InvalidSpecification(String),

    #[error("job {0} is not in the schedule")]
    UnknownJob(JobId),

    #[error("job {0} is already scheduled or staged")]
    DuplicateJob(JobId),

    #[error("job {job} starts at {start}, before the frozen horizon {horizon}")]
    Frozen { job: JobId, start: Time, horizon: TimeBound },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    ArcTime(#[from] ArcTimeError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PlanResult<T> = Result<T, PlanError>;
