//! Lower-triangular matrix of pairwise alignments.

use crate::alignment::Alignment;

/// Pairwise alignments stored as a lower-triangular flat vector.
///
/// For `n` sequences, stores `n*(n-1)/2` alignments. Entry `(i, j)` with
/// `i > j` is the alignment of sequence `j` against sequence `i`; reading
/// `(j, i)` returns the same alignment with the shift negated. The diagonal
/// is [`Alignment::IDENTITY`].
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Alignment>,
}

impl DistanceMatrix {
    /// `data` must hold `n*(n-1)/2` entries laid out as `data[row*(row-1)/2 + col]`, `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<Alignment>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Return the number of sequences in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix covers no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the alignment of sequence `j` against sequence `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Alignment {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => Alignment::IDENTITY,
            std::cmp::Ordering::Greater => self.data[i * (i - 1) / 2 + j],
            std::cmp::Ordering::Less => self.data[j * (j - 1) / 2 + i].reversed(),
        }
    }

    /// Shape distance between sequences `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.get(i, j).distance()
    }

    /// Iterate over all unique pairs `(i, j, alignment)` where `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Alignment)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[i * (i - 1) / 2 + j])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_matrix() -> DistanceMatrix {
        // Layout: (1,0), (2,0), (2,1)
        let data = vec![
            Alignment::new(1, 0.5),
            Alignment::new(-2, 1.5),
            Alignment::new(0, 2.5),
        ];
        DistanceMatrix::from_raw(3, data)
    }

    #[test]
    fn diagonal_is_identity() {
        let m = make_matrix();
        for i in 0..3 {
            assert_eq!(m.get(i, i), Alignment::IDENTITY);
        }
    }

    #[test]
    fn transposed_access_negates_shift() {
        let m = make_matrix();
        assert_eq!(m.get(2, 0).shift(), -2);
        assert_eq!(m.get(0, 2).shift(), 2);
        assert_eq!(m.distance(0, 2), m.distance(2, 0));
    }

    #[test]
    fn iter_yields_lower_triangle() {
        let m = make_matrix();
        let pairs: Vec<_> = m.iter().map(|(i, j, a)| (i, j, a.distance())).collect();
        assert_eq!(pairs, vec![(1, 0, 0.5), (2, 0, 1.5), (2, 1, 2.5)]);
    }

    #[test]
    fn len_and_is_empty() {
        let m = make_matrix();
        assert_eq!(m.len(), 3);
        assert!(!m.is_empty());
        assert!(DistanceMatrix::from_raw(0, vec![]).is_empty());
    }
}
