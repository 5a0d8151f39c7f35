//! Validated sequence types.

use std::ops::Index;

use crate::error::ShapeError;

fn validate(values: &[f64]) -> Result<(), ShapeError> {
    if values.is_empty() {
        return Err(ShapeError::EmptySequence);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ShapeError::NonFiniteValue { index });
    }
    Ok(())
}

/// Owned sequence of weekly counts. Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence(Vec<f64>);

impl Sequence {
    /// Create a new sequence, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ShapeError::EmptySequence`] | `values` is empty |
    /// | [`ShapeError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, ShapeError> {
        validate(&values)?;
        Ok(Self(values))
    }

    /// Create a sequence of `len` copies of `level`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Sequence::new`]: `len == 0` or a non-finite `level`.
    pub fn constant(len: usize, level: f64) -> Result<Self, ShapeError> {
        Self::new(vec![level; len])
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView(&self.0)
    }

    /// Return the number of weeks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed sequence; present for `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arithmetic mean of all values.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.as_view().mean()
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for Sequence {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Sequence {
    type Error = ShapeError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Borrowed, validated view into a sequence.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a>(&'a [f64]);

impl<'a> SequenceView<'a> {
    /// Create a new view, validating that the slice is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ShapeError::EmptySequence`] | `slice` is empty |
    /// | [`ShapeError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(slice: &'a [f64]) -> Result<Self, ShapeError> {
        validate(slice)?;
        Ok(Self(slice))
    }

    /// Return the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    /// Return the number of weeks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arithmetic mean of all values.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }
}

impl Index<usize> for SequenceView<'_> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for SequenceView<'_> {
    fn as_ref(&self) -> &[f64] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(matches!(Sequence::new(vec![]), Err(ShapeError::EmptySequence)));
        assert!(matches!(SequenceView::new(&[]), Err(ShapeError::EmptySequence)));
    }

    #[test]
    fn rejects_non_finite() {
        let result = Sequence::new(vec![0.1, 2.0, f64::NAN]);
        assert!(matches!(result, Err(ShapeError::NonFiniteValue { index: 2 })));

        let data = [f64::NEG_INFINITY, 1.0];
        let result = SequenceView::new(&data);
        assert!(matches!(result, Err(ShapeError::NonFiniteValue { index: 0 })));
    }

    #[test]
    fn constant_fills_level() {
        let s = Sequence::constant(4, 0.1).unwrap();
        assert_eq!(s.as_ref(), &[0.1, 0.1, 0.1, 0.1]);
        assert!(Sequence::constant(0, 0.1).is_err());
    }

    #[test]
    fn mean_of_counts() {
        let s = Sequence::new(vec![1.0, 2.0, 3.0, 6.0]).unwrap();
        assert!((s.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn view_shares_data() {
        let s: Sequence = vec![10.0, 20.0, 30.0].try_into().unwrap();
        let view = s.as_view();
        assert_eq!(view.len(), 3);
        assert_eq!(view[1], 20.0);
        assert_eq!(view.as_slice(), s.as_ref());
    }
}
