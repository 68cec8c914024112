//! Idle-interval queries shared by committed and staged node state.

use fl_core::{ConvexPolygon, NodeId, Point, Time, TimeBound};
use fl_trajectory::{DynamicObstacle, Trajectory};

use crate::{Job, NodeSpecification};

/// A maximal stretch without a job, with where the node is at either end.
///
/// `finish_location` is `None` when the slot runs to `+∞`: nothing after it
/// pins the node down.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleSlot {
    pub start_time: Time,
    pub start_location: Point,
    pub finish_time: TimeBound,
    pub finish_location: Option<Point>,
}

impl IdleSlot {
    /// Seconds available, `f64::INFINITY` for an open-ended slot.
    pub fn duration(&self) -> f64 {
        match self.finish_time {
            TimeBound::At(t) => t - self.start_time,
            _ => f64::INFINITY,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.finish_time == TimeBound::PosInfinity
    }

    /// `true` if `[from, to]` fits inside the slot.
    pub fn contains(&self, from: Time, to: Time) -> bool {
        self.start_time <= from && TimeBound::At(to) <= self.finish_time
    }
}

/// Read access to one node's jobs and trajectory.
///
/// Implemented by [`Node`](crate::Node) for committed state and by the
/// schedule's overlaid view for committed-plus-staged state.  The provided
/// methods derive idle slots and idle boundaries from the four required ones.
pub trait NodeState {
    fn spec(&self) -> &NodeSpecification;

    /// Earliest instant the node's history covers.
    fn birth(&self) -> Time;

    /// Jobs ordered by start time.
    fn job_list(&self) -> Vec<Job>;

    /// Location at `t`; `None` before birth.
    fn location_at(&self, t: Time) -> Option<Point>;

    /// The trajectory over `[from, to]`, parked stretches included.
    fn trajectory_slice(&self, from: Time, to: Time) -> Trajectory;

    // ── Provided ──────────────────────────────────────────────────────────

    fn id(&self) -> NodeId {
        self.spec().id
    }

    fn shape(&self) -> &ConvexPolygon {
        &self.spec().shape
    }

    fn max_speed(&self) -> f64 {
        self.spec().max_speed
    }

    fn radius(&self) -> f64 {
        self.spec().radius()
    }

    /// `[max(from, birth), to)` minus every job interval, as idle slots.
    ///
    /// A slot ending at a job carries the job's location; a slot cut off by
    /// a finite `to` carries the interpolated location there.
    fn idle_slots(&self, from: Time, to: TimeBound) -> Vec<IdleSlot> {
        let lo = from.max(self.birth());
        if TimeBound::At(lo) >= to {
            return Vec::new();
        }
        let here = |t: Time| self.location_at(t).unwrap_or(self.spec().initial_location);

        let mut slots = Vec::new();
        let mut cursor = lo;
        let mut cursor_location = here(lo);

        for job in self.job_list() {
            let finish = job.finish_time();
            if finish <= cursor {
                continue;
            }
            if TimeBound::At(job.start_time) >= to {
                break;
            }
            if job.start_time > cursor {
                slots.push(IdleSlot {
                    start_time: cursor,
                    start_location: cursor_location,
                    finish_time: TimeBound::At(job.start_time),
                    finish_location: Some(job.location),
                });
            }
            cursor = finish;
            cursor_location = job.location;
            if TimeBound::At(cursor) >= to {
                return slots;
            }
        }

        slots.push(IdleSlot {
            start_time: cursor,
            start_location: cursor_location,
            finish_time: to,
            finish_location: to.finite().map(here),
        });
        slots
    }

    /// Start of the idle interval containing `t`: the finish of the latest
    /// job ending at or before `t`, else birth.  `None` if `t` lies strictly
    /// inside a job or before birth.
    fn floor_idle_time(&self, t: Time) -> Option<Time> {
        let birth = self.birth();
        if t < birth {
            return None;
        }
        let mut floor = birth;
        for job in self.job_list() {
            if job.strictly_contains(t) {
                return None;
            }
            let finish = job.finish_time();
            if finish <= t {
                floor = floor.max(finish);
            }
        }
        Some(floor)
    }

    /// End of the idle interval containing `t`: the start of the earliest
    /// job starting at or after `t`, else `+∞`.  `None` if `t` lies strictly
    /// inside a job.
    fn ceiling_idle_time(&self, t: Time) -> Option<TimeBound> {
        let mut ceiling = TimeBound::PosInfinity;
        for job in self.job_list() {
            if job.strictly_contains(t) {
                return None;
            }
            if job.start_time >= t {
                ceiling = ceiling.min(TimeBound::At(job.start_time));
            }
        }
        Some(ceiling)
    }

    /// This node as a moving obstacle over `[from, to]`.
    fn as_obstacle(&self, from: Time, to: Time) -> DynamicObstacle {
        DynamicObstacle::new(self.shape().clone(), self.trajectory_slice(from, to))
    }
}
