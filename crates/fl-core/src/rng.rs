//! Deterministic scheduler-level RNG.
//!
//! Location sampling is the only randomised step of planning.  All of it
//! flows through one seeded `SmallRng`, so the same seed and the same
//! sequence of requests always produce the same schedule.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::geo::{Envelope, Point};

/// Seeded RNG used by the schedulers.
///
/// Used only in single-threaded contexts.  Parallel evaluation draws every
/// pick up front, before the work is split.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform point inside `env`.  Degenerate extents collapse to the bound.
    pub fn point_in(&mut self, env: &Envelope) -> Point {
        let x = if env.width() > 0.0 { self.0.gen_range(env.min.x..=env.max.x) } else { env.min.x };
        let y = if env.height() > 0.0 { self.0.gen_range(env.min.y..=env.max.y) } else { env.min.y };
        Point::new(x, y)
    }
}
