//! Jobs.

use fl_core::{JobId, NodeId, Point, Time};

use crate::{NodeError, NodeResult};

/// A located, time-boxed unit of work owned by exactly one node.
///
/// The node stands at `location` for `[start_time, finish_time)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub id: JobId,
    pub node: NodeId,
    pub location: Point,
    pub start_time: Time,
    pub duration: f64,
}

impl Job {
    pub fn new(id: JobId, node: NodeId, location: Point, start_time: Time, duration: f64) -> NodeResult<Self> {
        let job = Self { id, node, location, start_time, duration };
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> NodeResult<()> {
        let reason = if !(self.duration.is_finite() && self.duration > 0.0) {
            format!("duration must be positive, got {}", self.duration)
        } else if !self.start_time.is_finite() {
            "start time is not finite".to_owned()
        } else if !self.location.is_finite() {
            "location is not finite".to_owned()
        } else {
            return Ok(());
        };
        Err(NodeError::InvalidJob { job: self.id, reason })
    }

    #[inline]
    pub fn finish_time(&self) -> Time {
        self.start_time + self.duration
    }

    /// `true` if `[start_time, finish_time)` meets `[from, to)`.
    #[inline]
    pub fn overlaps(&self, from: Time, to: Time) -> bool {
        self.start_time < to && from < self.finish_time()
    }

    /// `true` if `t` lies strictly inside the job.
    #[inline]
    pub fn strictly_contains(&self, t: Time) -> bool {
        self.start_time < t && t < self.finish_time()
    }
}
