//! Planner configuration.
//!
//! Typically loaded from a TOML/JSON file by the application crate (with the
//! `serde` feature) and handed to the scheduler builder.

use crate::{CoreError, CoreResult};

/// Tunables shared by the pathfinders, planners and schedulers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Master RNG seed for location sampling.  The same seed always
    /// produces identical schedules for identical request sequences.
    pub seed: u64,

    /// How many candidate locations the singular scheduler samples from a
    /// location region before giving up.
    pub max_location_picks: usize,

    /// Seconds a dependent job must start after each of its dependencies
    /// has finished.
    pub dependency_margin: f64,

    /// Shortest wait, in seconds, the lazy mesh materialises as its own
    /// stop vertex.
    pub min_stop_duration: f64,

    /// Arc length by which forbidden regions of the first and last path
    /// segment are extended past the route ends.
    pub arc_buffer: f64,

    /// Distance below which two locations count as the same place.
    pub location_tolerance: f64,

    /// Seconds below which two instants count as the same.
    pub time_tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed:               42,
            max_location_picks: 8,
            dependency_margin:  1.0,
            min_stop_duration:  1e-3,
            arc_buffer:         1e-6,
            location_tolerance: 1e-6,
            time_tolerance:     1e-6,
        }
    }
}

impl PlannerConfig {
    /// Reject values the planners cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_location_picks == 0 {
            return Err(CoreError::Config("max_location_picks must be > 0".into()));
        }
        let non_negative = [
            ("dependency_margin", self.dependency_margin),
            ("min_stop_duration", self.min_stop_duration),
            ("arc_buffer", self.arc_buffer),
            ("location_tolerance", self.location_tolerance),
            ("time_tolerance", self.time_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CoreError::Config(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        Ok(())
    }
}
