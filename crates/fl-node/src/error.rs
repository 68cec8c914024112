use fl_core::{CoreError, JobId, NodeId, Time};
use fl_trajectory::TrajectoryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    #[error("invalid node specification: {0}")]
    InvalidSpecification(String),

    #[error("invalid job {job}: {reason}")]
    InvalidJob { job: JobId, reason: String },

    #[error("{job} belongs to {owner}, not {node}")]
    ForeignJob { job: JobId, owner: NodeId, node: NodeId },

    #[error("{job} already exists on this node")]
    DuplicateJob { job: JobId },

    #[error("{job} overlaps {other}")]
    JobOverlap { job: JobId, other: JobId },

    #[error("{job} starts at {start}, before the node exists ({birth})")]
    JobBeforeBirth { job: JobId, start: Time, birth: Time },

    #[error("unknown {0}")]
    UnknownJob(JobId),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type NodeResult<T> = Result<T, NodeError>;
