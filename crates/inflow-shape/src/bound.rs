//! Limits on how far one sequence may be slid against another.

/// Bound on the shift search of [`ShapeDistance`](crate::ShapeDistance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShiftBound {
    /// Every shift with a non-empty overlap is considered.
    #[default]
    Unbounded,

    /// Only shifts with `|s| <= radius` are considered.
    ///
    /// The minimum overlap of [`ShapeDistance`](crate::ShapeDistance) can
    /// narrow this further; see [`ShapeDistance::max_shift`](crate::ShapeDistance::max_shift).
    Radius(usize),
}

impl ShiftBound {
    /// Build a bound from an optional radius; `None` means unbounded.
    #[must_use]
    pub fn from_radius(radius: Option<usize>) -> Self {
        radius.map_or(Self::Unbounded, Self::Radius)
    }

    /// Largest `|s|` allowed for sequences of length `len`.
    ///
    /// Saturates at `len - 1`, the last shift whose overlap is non-empty.
    #[must_use]
    pub fn max_shift(&self, len: usize) -> usize {
        let widest = len.saturating_sub(1);
        match self {
            Self::Unbounded => widest,
            Self::Radius(r) => (*r).min(widest),
        }
    }
}
