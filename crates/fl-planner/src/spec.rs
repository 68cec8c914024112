//! What a caller asks for: where a job may happen, when it may start and
//! how long it takes.

use fl_core::{ConvexPolygon, JobId, Point, SimRng, Time};

use crate::{PlanError, PlanResult};

/// Rejection-sampling attempts before a region falls back to its centroid.
const SAMPLE_ATTEMPTS: usize = 64;

/// Where a job may be carried out.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationSpace {
    Point(Point),
    Region(ConvexPolygon),
}

impl LocationSpace {
    /// One point of the space, uniformly distributed over a region.
    pub fn sample(&self, rng: &mut SimRng) -> Point {
        match self {
            LocationSpace::Point(p) => *p,
            LocationSpace::Region(poly) => {
                let env = poly.envelope();
                (0..SAMPLE_ATTEMPTS)
                    .map(|_| rng.point_in(&env))
                    .find(|p| poly.contains(*p))
                    .unwrap_or_else(|| poly.centroid())
            }
        }
    }

    /// The locations a scheduler should try, in order: the point itself,
    /// or `picks` samples of a region.
    pub fn candidates(&self, rng: &mut SimRng, picks: usize) -> Vec<Point> {
        match self {
            LocationSpace::Point(p) => vec![*p],
            LocationSpace::Region(_) => (0..picks).map(|_| self.sample(rng)).collect(),
        }
    }
}

impl From<Point> for LocationSpace {
    fn from(p: Point) -> Self {
        LocationSpace::Point(p)
    }
}

impl From<ConvexPolygon> for LocationSpace {
    fn from(poly: ConvexPolygon) -> Self {
        LocationSpace::Region(poly)
    }
}

// ── Single job ────────────────────────────────────────────────────────────────

/// Constraints for one job: any location in `location`, a start within
/// `[earliest_start, latest_start]`, and `duration` seconds of work.
#[derive(Clone, Debug, PartialEq)]
pub struct JobSpecification {
    pub id: JobId,
    pub location: LocationSpace,
    pub earliest_start: Time,
    pub latest_start: Time,
    pub duration: f64,
}

impl JobSpecification {
    pub fn validate(&self) -> PlanResult<()> {
        check_window(self.id, self.earliest_start, self.latest_start, self.duration)
    }

    pub fn latest_finish(&self) -> Time {
        self.latest_start + self.duration
    }
}

fn check_window(id: JobId, earliest: Time, latest: Time, duration: f64) -> PlanResult<()> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(PlanError::InvalidSpecification(format!("{id}: duration must be positive, got {duration}")));
    }
    if !(earliest.is_finite() && latest.is_finite()) {
        return Err(PlanError::InvalidSpecification(format!("{id}: start window must be finite")));
    }
    if latest < earliest {
        return Err(PlanError::InvalidSpecification(format!(
            "{id}: latest start {latest} precedes earliest start {earliest}"
        )));
    }
    Ok(())
}

// ── Periodic job ──────────────────────────────────────────────────────────────

/// A job repeated once per id in `ids`, each repetition's window shifted by
/// one more `period` than the last.
///
/// With `same_location` every repetition happens at the same sampled
/// location; otherwise each repetition samples its own.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicJobSpecification {
    pub ids: Vec<JobId>,
    pub location: LocationSpace,
    pub earliest_start: Time,
    pub latest_start: Time,
    pub duration: f64,
    pub period: f64,
    pub same_location: bool,
}

impl PeriodicJobSpecification {
    pub fn validate(&self) -> PlanResult<()> {
        let Some(&first) = self.ids.first() else {
            return Err(PlanError::InvalidSpecification("periodic job needs at least one id".into()));
        };
        check_window(first, self.earliest_start, self.latest_start, self.duration)?;
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(PlanError::InvalidSpecification(format!(
                "{first}: period must be positive, got {}",
                self.period
            )));
        }
        let mut seen = self.ids.clone();
        seen.sort_unstable();
        if let Some(pair) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(PlanError::DuplicateJob(pair[0]));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The `k`-th repetition as a single job, or `None` past the last id.
    pub fn repetition(&self, k: usize) -> Option<JobSpecification> {
        let id = *self.ids.get(k)?;
        let shift = self.period * k as f64;
        Some(JobSpecification {
            id,
            location: self.location.clone(),
            earliest_start: self.earliest_start + shift,
            latest_start: self.latest_start + shift,
            duration: self.duration,
        })
    }

    pub fn repetitions(&self) -> impl Iterator<Item = JobSpecification> + '_ {
        (0..self.ids.len()).filter_map(|k| self.repetition(k))
    }

    /// The same series pinned to one location.
    pub fn at(&self, location: Point) -> Self {
        Self { location: LocationSpace::Point(location), ..self.clone() }
    }
}
