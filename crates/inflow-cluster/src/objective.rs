use std::cmp::Ordering;
use std::fmt;

/// Sum of squared shape distances from each sequence to its assigned centroid.
///
/// Lower is tighter. Used to pick the best of several restarts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Objective(f64);

impl Objective {
    /// Wrap a raw objective value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Sum the squares of per-sequence distances.
    pub(crate) fn from_distances(distances: &[f64]) -> Self {
        Self(distances.iter().map(|d| d.powi(2)).sum())
    }

    /// Return the raw value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::Objective;

    #[test]
    fn sums_squares() {
        let o = Objective::from_distances(&[1.0, 2.0, 0.5]);
        assert!((o.value() - 5.25).abs() < 1e-12);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Objective::new(1.5)), "1.500000");
    }

    #[test]
    fn total_cmp_ordering() {
        let a = Objective::new(0.5);
        let b = Objective::new(2.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(b.total_cmp(&a), Ordering::Greater);
    }
}
