//! Error types for sequence validation and shape alignment.

/// Errors from sequence construction and shape distance computation.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// Returned when an empty slice is provided as a sequence.
    #[error("sequence must be non-empty")]
    EmptySequence,

    /// Returned when a sequence contains NaN or an infinity.
    #[error("sequence contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when two sequences that must be compared have different lengths.
    #[error("sequence lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first (reference) sequence.
        left: usize,
        /// Length of the offending sequence.
        right: usize,
    },
}
