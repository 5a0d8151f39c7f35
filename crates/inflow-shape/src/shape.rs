//! Shape distance computation.

use std::cmp::Ordering;
use std::ops::Range;

use rayon::prelude::*;
use tracing::instrument;

use crate::alignment::Alignment;
use crate::bound::ShiftBound;
use crate::error::ShapeError;
use crate::matrix::DistanceMatrix;
use crate::normalize::z_normalize_into;
use crate::sequence::{Sequence, SequenceView};

/// Indices of the first sequence that have a partner at `shift`.
///
/// For sequences of length `len`, position i pairs with i + shift; the
/// returned range is every i for which both positions lie in `0..len`.
/// Empty when `|shift| >= len`.
#[must_use]
pub fn overlap(len: usize, shift: isize) -> Range<usize> {
    let magnitude = shift.unsigned_abs();
    if magnitude >= len {
        return 0..0;
    }
    if shift >= 0 { 0..len - magnitude } else { magnitude..len }
}

/// Shifts in search order up to `max_shift`: 0, then each magnitude with
/// the preferred sign first.
fn search_order(max_shift: usize, positive_first: bool) -> impl Iterator<Item = isize> {
    std::iter::once(0).chain((1..=max_shift as isize).flat_map(move |m| {
        if positive_first { [m, -m] } else { [-m, m] }
    }))
}

/// Lexicographic order of two equal-length slices under `total_cmp`.
fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Immutable shape distance configuration. Thread-safe and copyable.
///
/// | Setting | Default |
/// |---|---|
/// | shift bound | [`ShiftBound::Unbounded`] |
/// | minimum overlap | `ceil(len / 2)` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeDistance {
    bound: ShiftBound,
    min_overlap: Option<usize>,
}

impl ShapeDistance {
    /// Create a calculator that searches every shift.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a calculator limited to `|s| <= max_shift`.
    ///
    /// The minimum overlap still applies: with the default of `ceil(len / 2)`
    /// no shift beyond `len / 2` is searched, whatever `max_shift` says.
    #[must_use]
    pub fn with_max_shift(max_shift: usize) -> Self {
        Self::from_bound(ShiftBound::Radius(max_shift))
    }

    /// Create a calculator from an existing [`ShiftBound`].
    #[must_use]
    pub fn from_bound(bound: ShiftBound) -> Self {
        Self { bound, min_overlap: None }
    }

    /// Require at least `min_overlap` paired weeks for a shift to be considered.
    ///
    /// Values are clamped to `1..=len` at alignment time, so `1` only
    /// excludes empty overlaps.
    #[must_use]
    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = Some(min_overlap);
        self
    }

    /// Return the shift bound.
    #[must_use]
    pub fn bound(&self) -> ShiftBound {
        self.bound
    }

    /// Minimum overlap applied to sequences of length `len`.
    #[must_use]
    pub fn min_overlap(&self, len: usize) -> usize {
        self.min_overlap
            .unwrap_or_else(|| len.div_ceil(2))
            .clamp(1, len.max(1))
    }

    /// Largest `|s|` searched for sequences of length `len`.
    #[must_use]
    pub fn max_shift(&self, len: usize) -> usize {
        self.bound
            .max_shift(len)
            .min(len.saturating_sub(self.min_overlap(len)))
    }

    /// Find the shift of `b` against `a` with the smallest shape distance.
    ///
    /// Each overlapping pair of segments is z-normalized independently; the
    /// score of a shift is the mean squared difference over the overlap and
    /// the returned distance is its square root. Ties keep the smallest
    /// `|s|`. When `-s` and `+s` tie, `+s` wins if `a` sorts before `b`
    /// lexicographically and `-s` otherwise, so swapping the arguments
    /// always negates the shift.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ShapeError::LengthMismatch`] | `a` and `b` differ in length |
    #[instrument(level = "trace", skip(self, a, b), fields(len = a.len()))]
    pub fn align(&self, a: SequenceView<'_>, b: SequenceView<'_>) -> Result<Alignment, ShapeError> {
        if a.len() != b.len() {
            return Err(ShapeError::LengthMismatch { left: a.len(), right: b.len() });
        }
        Ok(self.align_unchecked(a.as_slice(), b.as_slice()))
    }

    fn align_unchecked(&self, a: &[f64], b: &[f64]) -> Alignment {
        let len = a.len();
        let mut za = vec![0.0; len];
        let mut zb = vec![0.0; len];

        let mut best_shift = 0isize;
        let mut best_score = f64::INFINITY;
        let positive_first = lexicographic(a, b) == Ordering::Less;

        for shift in search_order(self.max_shift(len), positive_first) {
            let range = overlap(len, shift);
            let width = range.len();
            let other = shifted(&range, shift);

            z_normalize_into(&a[range], &mut za[..width]);
            z_normalize_into(&b[other], &mut zb[..width]);

            let sum_sq: f64 = za[..width]
                .iter()
                .zip(&zb[..width])
                .map(|(x, y)| (x - y).powi(2))
                .sum();
            let score = sum_sq / width as f64;

            if score < best_score {
                best_score = score;
                best_shift = shift;
            }
        }

        Alignment::new(best_shift, best_score.sqrt())
    }

    /// Place `b`'s z-normalized overlap segment at the positions of the
    /// reference it is paired with at `shift`; positions outside the
    /// overlap are zero.
    ///
    /// This is the member vector used when refitting a centroid from
    /// aligned members.
    #[must_use]
    pub fn project(&self, b: SequenceView<'_>, shift: isize) -> Vec<f64> {
        let len = b.len();
        let range = overlap(len, shift);
        let other = shifted(&range, shift);
        let mut out = vec![0.0; len];
        z_normalize_into(&b.as_slice()[other], &mut out[range]);
        out
    }

    /// Compute alignments for all unique pairs of `sequences`.
    ///
    /// Pairs are evaluated in parallel with rayon and collected in index
    /// order, so the matrix is identical for any thread count.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ShapeError::LengthMismatch`] | Any sequence differs in length from the first |
    #[instrument(skip(self, sequences), fields(n = sequences.len()))]
    pub fn pairwise(&self, sequences: &[Sequence]) -> Result<DistanceMatrix, ShapeError> {
        let n = sequences.len();
        if let Some(first) = sequences.first()
            && let Some(bad) = sequences.iter().find(|s| s.len() != first.len())
        {
            return Err(ShapeError::LengthMismatch { left: first.len(), right: bad.len() });
        }

        let total_pairs = n * n.saturating_sub(1) / 2;
        let alignments: Vec<Alignment> = (0..total_pairs)
            .into_par_iter()
            .map(|flat_idx| {
                // flat_idx = i*(i-1)/2 + j with i > j
                let i = ((1.0 + (1.0 + 8.0 * flat_idx as f64).sqrt()) / 2.0).floor() as usize;
                let j = flat_idx - i * (i - 1) / 2;
                self.align_unchecked(sequences[i].as_ref(), sequences[j].as_ref())
            })
            .collect();

        Ok(DistanceMatrix::from_raw(n, alignments))
    }
}

fn shifted(range: &Range<usize>, shift: isize) -> Range<usize> {
    range.start.wrapping_add_signed(shift)..range.end.wrapping_add_signed(shift)
}
