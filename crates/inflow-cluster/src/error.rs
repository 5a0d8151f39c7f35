use inflow_shape::ShapeError;

/// Rejected clustering input, detected before any work is done.
#[derive(Debug, thiserror::Error)]
pub enum InvalidInput {
    /// Returned when k is zero.
    #[error("k must be at least 1, got {k}")]
    InvalidK {
        /// The invalid k value provided.
        k: usize,
    },

    /// Returned when no sequences are provided.
    #[error("no sequences to cluster")]
    EmptyInput,

    /// Returned when fewer sequences are provided than the requested k.
    #[error("need at least {k} sequences to form {k} clusters, got {n_sequences}")]
    TooFewSequences {
        /// Number of sequences provided.
        n_sequences: usize,
        /// Requested number of clusters.
        k: usize,
    },

    /// Returned when a sequence differs in length from the first one.
    #[error("sequence {index} has length {got}, expected {expected}")]
    LengthMismatch {
        /// Position of the offending sequence.
        index: usize,
        /// Length of the first sequence.
        expected: usize,
        /// Length of the offending sequence.
        got: usize,
    },

    /// Returned when a scan range `[min_k, max_k)` is empty.
    #[error("k range [{min_k}, {max_k}) is empty")]
    InvalidKRange {
        /// First k scanned.
        min_k: usize,
        /// One past the last k scanned.
        max_k: usize,
    },
}

/// Errors from clustering and cluster-count scoring.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Wraps an input validation failure.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Returned in strict mode when assignments are still changing after `max_iter` rounds.
    #[error("k={k} did not converge within {max_iter} iterations")]
    DidNotConverge {
        /// Number of clusters requested.
        k: usize,
        /// The iteration cap that was hit.
        max_iter: usize,
    },

    /// Wraps a shape distance error.
    #[error("shape distance error: {0}")]
    Shape(#[from] ShapeError),
}

/// Check `sequences` for a run with `k` clusters and return their common length.
pub(crate) fn validate(sequences: &[inflow_shape::Sequence], k: usize) -> Result<usize, InvalidInput> {
    if k == 0 {
        return Err(InvalidInput::InvalidK { k });
    }
    let Some(first) = sequences.first() else {
        return Err(InvalidInput::EmptyInput);
    };
    if sequences.len() < k {
        return Err(InvalidInput::TooFewSequences { n_sequences: sequences.len(), k });
    }
    let expected = first.len();
    if let Some((index, s)) = sequences.iter().enumerate().find(|(_, s)| s.len() != expected) {
        return Err(InvalidInput::LengthMismatch { index, expected, got: s.len() });
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use inflow_shape::Sequence;

    use super::*;

    fn seq(values: &[f64]) -> Sequence {
        Sequence::new(values.to_vec()).unwrap()
    }

    #[test]
    fn rejects_zero_k() {
        let data = vec![seq(&[1.0, 2.0])];
        assert!(matches!(validate(&data, 0), Err(InvalidInput::InvalidK { k: 0 })));
    }

    #[test]
    fn rejects_empty_set() {
        assert!(matches!(validate(&[], 1), Err(InvalidInput::EmptyInput)));
    }

    #[test]
    fn rejects_too_few() {
        let data = vec![seq(&[1.0, 2.0]), seq(&[2.0, 1.0])];
        assert!(matches!(
            validate(&data, 3),
            Err(InvalidInput::TooFewSequences { n_sequences: 2, k: 3 })
        ));
    }

    #[test]
    fn rejects_ragged_lengths() {
        let data = vec![seq(&[1.0, 2.0, 3.0]), seq(&[1.0, 2.0, 3.0]), seq(&[1.0, 2.0])];
        assert!(matches!(
            validate(&data, 2),
            Err(InvalidInput::LengthMismatch { index: 2, expected: 3, got: 2 })
        ));
    }

    #[test]
    fn returns_common_length() {
        let data = vec![seq(&[1.0, 2.0, 3.0]), seq(&[3.0, 2.0, 1.0])];
        assert_eq!(validate(&data, 2).unwrap(), 3);
    }

    #[test]
    fn display_wraps_cause() {
        let err = ClusterError::from(InvalidInput::InvalidK { k: 0 });
        assert_eq!(err.to_string(), "invalid input: k must be at least 1, got 0");
    }
}
