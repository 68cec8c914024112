//! The `TrajectoryContainer` — one node's committed space-time history.

use std::collections::BTreeMap;

use fl_core::{Point, Time};

use crate::{Trajectory, TrajectoryError, TrajectoryResult};

/// Gap-free, time-ordered store of trajectory segments keyed by start time.
///
/// Consecutive segments abut exactly (`finish == next.start`).  Before the
/// first segment the node stands at `origin`; after the last one it stays
/// parked at the final location.  Writing a segment clips or splits
/// whatever it overlaps and fills a hole after the current tail with a
/// parked segment, so the invariant survives every [`update`](Self::update).
#[derive(Clone, Debug)]
pub struct TrajectoryContainer {
    origin: Point,
    birth: Time,
    segments: BTreeMap<Time, Trajectory>,
}

impl TrajectoryContainer {
    /// An empty history: parked at `origin` from `birth` on.
    pub fn new(origin: Point, birth: Time) -> Self {
        Self { origin, birth, segments: BTreeMap::new() }
    }

    pub fn birth(&self) -> Time {
        self.birth
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of stored segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Stored segments in time order.
    pub fn segments(&self) -> impl Iterator<Item = &Trajectory> + '_ {
        self.segments.values()
    }

    /// Finish time of the last stored segment, or `None` if nothing is stored.
    pub fn finish_time(&self) -> Option<Time> {
        self.segments.values().next_back().and_then(Trajectory::finish_time)
    }

    /// Where the node parks once its stored history runs out.
    pub fn final_location(&self) -> Point {
        self.segments
            .values()
            .next_back()
            .and_then(Trajectory::finish_location)
            .unwrap_or(self.origin)
    }

    /// Location at `t`, including the parked extensions; `None` before birth.
    pub fn location_at(&self, t: Time) -> Option<Point> {
        if t < self.birth {
            return None;
        }
        match self.segments.range(..=t).next_back() {
            None => Some(self.origin),
            Some((_, seg)) => seg.location_at(t).or_else(|| seg.finish_location()),
        }
    }

    /// Write `traj` into the history, replacing whatever it overlaps.
    pub fn update(&mut self, traj: Trajectory) -> TrajectoryResult<()> {
        let (Some(start), Some(finish)) = (traj.start_time(), traj.finish_time()) else {
            return Ok(());
        };
        if start < self.birth {
            return Err(TrajectoryError::BeforeBirth { start, birth: self.birth });
        }

        let tail = self.finish_time().unwrap_or(self.birth);
        if start > tail {
            let parked = Trajectory::stationary(self.final_location(), tail, start)?;
            self.segments.insert(tail, parked);
        }

        let overlapping: Vec<Time> = self
            .segments
            .range(..finish)
            .filter(|(_, seg)| seg.finish_time().is_some_and(|f| f > start))
            .map(|(&k, _)| k)
            .collect();

        for key in overlapping {
            let Some(seg) = self.segments.remove(&key) else { continue };
            let (Some(s), Some(f)) = (seg.start_time(), seg.finish_time()) else { continue };
            if s < start {
                let left = seg.sub_trajectory(s, start);
                if !left.is_empty() {
                    self.segments.insert(s, left);
                }
            }
            if f > finish {
                let right = seg.sub_trajectory(finish, f);
                if !right.is_empty() {
                    self.segments.insert(finish, right);
                }
            }
        }

        self.segments.insert(start, traj);
        Ok(())
    }

    /// The history over `[from, to]` as one curve, with the parked
    /// stretches before the first and after the last segment made explicit.
    /// Clipped to start no earlier than birth.
    pub fn slice(&self, from: Time, to: Time) -> Trajectory {
        let from = from.max(self.birth);
        if from >= to {
            return Trajectory::empty();
        }

        let mut pieces: Vec<Trajectory> = Vec::new();
        let first_start = self.segments.keys().next().copied().unwrap_or(to);
        if from < first_start {
            if let Ok(t) = Trajectory::stationary(self.origin, from, first_start.min(to)) {
                pieces.push(t);
            }
        }

        let lead = self.segments.range(..=from).next_back().map(|(&k, _)| k).unwrap_or(from);
        for (_, seg) in self.segments.range(lead..to) {
            let sub = seg.sub_trajectory(from, to);
            if !sub.is_empty() {
                pieces.push(sub);
            }
        }

        let tail = self.finish_time().unwrap_or(to);
        if tail < to && !self.segments.is_empty() {
            if let Ok(t) = Trajectory::stationary(self.final_location(), tail.max(from), to) {
                pieces.push(t);
            }
        }

        let mut out = Trajectory::empty();
        for piece in pieces {
            // Stored segments abut exactly, so joining cannot fail; stop at
            // the first mismatch rather than return a curve with a hole.
            match out.concat(&piece, 1e-6) {
                Ok(joined) => out = joined,
                Err(_) => break,
            }
        }
        out
    }

    /// Drop history strictly before `t`.  The node's origin and birth move
    /// to its location at `t`.
    pub fn discard_before(&mut self, t: Time) {
        if t <= self.birth {
            return;
        }
        let Some(origin) = self.location_at(t) else { return };
        let stale: Vec<Time> = self.segments.range(..t).map(|(&k, _)| k).collect();
        for key in stale {
            let Some(seg) = self.segments.remove(&key) else { continue };
            if seg.finish_time().is_some_and(|f| f > t) {
                let rest = seg.sub_trajectory(t, seg.finish_time().unwrap_or(t));
                if !rest.is_empty() {
                    self.segments.insert(t, rest);
                }
            }
        }
        self.origin = origin;
        self.birth = t;
    }
}
