use fl_core::{CoreError, Time};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("a path or trajectory cannot have exactly one vertex")]
    SingleVertex,

    #[error("non-finite coordinate at vertex {0}")]
    NonFinite(usize),

    #[error("timestamps must be strictly increasing (vertex {0})")]
    NotCausal(usize),

    #[error("arc must be >= 0 (vertex {0})")]
    NegativeArc(usize),

    #[error("arc {arc} exceeds the spatial path length {length}")]
    ArcOutOfRange { arc: f64, length: f64 },

    #[error("{what}: {got} vertices given, {expected} expected")]
    LengthMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("trajectories are discontinuous at {0}")]
    Discontinuous(Time),

    #[error("segment starting at {start} precedes birth time {birth}")]
    BeforeBirth { start: Time, birth: Time },

    #[error("empty time interval [{from}, {to}]")]
    EmptyInterval { from: Time, to: Time },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type TrajectoryResult<T> = Result<T, TrajectoryError>;
