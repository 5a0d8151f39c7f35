//! Best alignment between two sequences.

use std::cmp::Ordering;
use std::fmt;

/// Winning shift and the shape distance it achieves.
///
/// At `shift` s, position i of the first sequence is paired with position
/// i + s of the second; a positive shift means the second sequence lags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    shift: isize,
    distance: f64,
}

impl Alignment {
    /// Self-alignment: zero shift, zero distance.
    pub const IDENTITY: Self = Self { shift: 0, distance: 0.0 };

    pub(crate) fn new(shift: isize, distance: f64) -> Self {
        Self { shift, distance }
    }

    /// Optimal shift of the second sequence relative to the first.
    #[must_use]
    pub fn shift(self) -> isize {
        self.shift
    }

    /// Root mean squared difference of the z-normalized overlap at [`shift`](Self::shift).
    #[must_use]
    pub fn distance(self) -> f64 {
        self.distance
    }

    /// The same alignment seen from the other sequence.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self { shift: -self.shift, distance: self.distance }
    }

    /// Total ordering by distance using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} @ {:+}", self.distance, self.shift)
    }
}
