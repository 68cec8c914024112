use fl_core::{CoreError, JobId, NodeId, Time, TimeBound};
use fl_node::NodeError;
use fl_trajectory::TrajectoryError;
use thiserror::Error;

use crate::{AlternativeId, BranchId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("unknown {0}")]
    UnknownNode(NodeId),

    #[error("{0} already exists")]
    DuplicateNode(NodeId),

    #[error("{0} still has jobs or outstanding alternatives")]
    NodeBusy(NodeId),

    #[error("unknown {0}")]
    UnknownJob(JobId),

    #[error("{0} is already scheduled or claimed by an outstanding alternative")]
    DuplicateJob(JobId),

    #[error("{0} is locked for removal by an outstanding alternative")]
    RemovalLocked(JobId),

    #[error("unknown {0}")]
    UnknownAlternative(AlternativeId),

    #[error("unknown or resolved {0}")]
    UnknownBranch(BranchId),

    #[error("{0} has open child branches")]
    Branched(BranchId),

    #[error("{0} cannot be merged into its parent")]
    NotMergeable(BranchId),

    #[error("alternative is sealed")]
    Sealed,

    #[error("alternative must be sealed first")]
    NotSealed,

    #[error("{what} at {time} precedes the frozen horizon {horizon}")]
    BeforeFrozenHorizon { what: &'static str, time: Time, horizon: TimeBound },

    #[error("frozen horizon cannot move back from {current} to {requested}")]
    HorizonRegression { current: TimeBound, requested: Time },

    #[error("{node}: inconsistent update: {reason}")]
    Inconsistent { node: NodeId, reason: String },

    #[error("{node}: staged trajectory does not splice at {at}")]
    Discontinuous { node: NodeId, at: Time },

    #[error("{node}: conflict: {reason}")]
    Conflict { node: NodeId, reason: String },

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
