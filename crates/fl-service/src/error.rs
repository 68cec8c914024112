//! Service-level error type.

use thiserror::Error;

use fl_core::{CoreError, TransactionId};
use fl_planner::PlanError;
use fl_schedule::ScheduleError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("scheduler configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("unknown transaction {0}")]
    UnknownTransaction(TransactionId),

    /// Every candidate was tried and none fits.  Nothing was staged.
    #[error("no feasible plan for {0}")]
    Infeasible(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
