//! Continuous time model.
//!
//! # Design
//!
//! Instants are `Time` values: seconds since an application-chosen epoch,
//! stored as `f64`.  Durations are plain `f64` seconds, so the arithmetic
//! mirrors the usual instant/duration split:
//!
//!   Time + f64 = Time,   Time - Time = f64
//!
//! `Time` is totally ordered via `f64::total_cmp`, which lets it key
//! `BTreeMap`s directly.  Constructors of trajectories reject non-finite
//! values, so the odd corners of IEEE ordering never show up in practice.
//!
//! Unbounded ends ("since forever", "until further notice") are expressed
//! with [`TimeBound`] instead of borrowing extreme `f64` values.

use std::cmp::Ordering;
use std::fmt;

// ── Time ──────────────────────────────────────────────────────────────────────

/// An absolute instant in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    #[inline]
    pub fn new(secs: f64) -> Self {
        Time(secs)
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    /// `true` if the two instants differ by at most `tolerance` seconds.
    #[inline]
    pub fn approx_eq(self, other: Time, tolerance: f64) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Time {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl std::ops::Add<f64> for Time {
    type Output = Time;
    #[inline]
    fn add(self, rhs: f64) -> Time {
        Time(self.0 + rhs)
    }
}

impl std::ops::Sub<f64> for Time {
    type Output = Time;
    #[inline]
    fn sub(self, rhs: f64) -> Time {
        Time(self.0 - rhs)
    }
}

impl std::ops::Sub for Time {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: Time) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.0)
    }
}

// ── TimeBound ─────────────────────────────────────────────────────────────────

/// A time value that may also be one of the two infinities.
///
/// Variant order gives the natural ordering:
/// `NegInfinity < At(_) < PosInfinity`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeBound {
    NegInfinity,
    At(Time),
    PosInfinity,
}

impl TimeBound {
    /// The finite instant, if any.
    #[inline]
    pub fn finite(self) -> Option<Time> {
        match self {
            TimeBound::At(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        matches!(self, TimeBound::At(_))
    }

    /// Clamp to a finite instant, mapping the infinities to `lo` / `hi`.
    #[inline]
    pub fn clamp_to(self, lo: Time, hi: Time) -> Time {
        match self {
            TimeBound::NegInfinity => lo,
            TimeBound::At(t) => t.clamp(lo, hi),
            TimeBound::PosInfinity => hi,
        }
    }
}

impl From<Time> for TimeBound {
    #[inline]
    fn from(t: Time) -> Self {
        TimeBound::At(t)
    }
}

impl PartialEq<Time> for TimeBound {
    fn eq(&self, other: &Time) -> bool {
        *self == TimeBound::At(*other)
    }
}

impl PartialOrd<Time> for TimeBound {
    fn partial_cmp(&self, other: &Time) -> Option<Ordering> {
        Some(self.cmp(&TimeBound::At(*other)))
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBound::NegInfinity => f.write_str("-inf"),
            TimeBound::At(t) => t.fmt(f),
            TimeBound::PosInfinity => f.write_str("+inf"),
        }
    }
}
