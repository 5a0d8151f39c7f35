//! Per-sequence cluster assignment, rebuilt wholesale every round.

use rayon::prelude::*;
use tracing::{debug, instrument};

use inflow_shape::{Sequence, ShapeDistance};

use crate::error::ClusterError;
use crate::label::ClusterLabel;
use crate::objective::Objective;

/// Label, best shift and distance for every input sequence.
///
/// Index `i` of each vector describes sequence `i`. Shifts are relative to
/// the assigned centroid: at shift s, centroid week j pairs with sequence
/// week j + s.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    labels: Vec<ClusterLabel>,
    shifts: Vec<isize>,
    distances: Vec<f64>,
}

impl Assignment {
    /// Assign every sequence to its nearest centroid.
    ///
    /// Ties go to the lowest cluster id. Parallel over sequences; results
    /// are collected in input order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::Shape`] | A sequence and a centroid differ in length |
    #[instrument(skip_all, fields(n = sequences.len(), k = centroids.len()))]
    pub(crate) fn compute(
        sequences: &[Sequence],
        centroids: &[Sequence],
        distance: &ShapeDistance,
    ) -> Result<Self, ClusterError> {
        let best: Vec<(ClusterLabel, isize, f64)> = sequences
            .par_iter()
            .map(|s| {
                let mut best = (ClusterLabel::new(0), 0isize, f64::INFINITY);
                for (c, centroid) in centroids.iter().enumerate() {
                    let al = distance.align(centroid.as_view(), s.as_view())?;
                    if al.distance() < best.2 {
                        best = (ClusterLabel::new(c), al.shift(), al.distance());
                    }
                }
                Ok(best)
            })
            .collect::<Result<_, ClusterError>>()?;

        let mut assignment = Self {
            labels: Vec::with_capacity(best.len()),
            shifts: Vec::with_capacity(best.len()),
            distances: Vec::with_capacity(best.len()),
        };
        for (label, shift, d) in best {
            assignment.labels.push(label);
            assignment.shifts.push(shift);
            assignment.distances.push(d);
        }

        debug!(objective = assignment.objective().value(), "assignment complete");
        Ok(assignment)
    }

    /// Cluster label of each sequence.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Best shift of each sequence against its centroid.
    #[must_use]
    pub fn shifts(&self) -> &[isize] {
        &self.shifts
    }

    /// Shape distance of each sequence to its centroid.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Number of assigned sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Return true if no sequences are assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum of squared distances.
    #[must_use]
    pub fn objective(&self) -> Objective {
        Objective::from_distances(&self.distances)
    }

    /// Member indices of each of the `k` clusters, in input order.
    #[must_use]
    pub fn groups(&self, k: usize) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); k];
        for (i, label) in self.labels.iter().enumerate() {
            groups[label.index()].push(i);
        }
        groups
    }
}

#[cfg(test)]
impl Assignment {
    pub(crate) fn from_parts(labels: Vec<usize>, shifts: Vec<isize>, distances: Vec<f64>) -> Self {
        Self {
            labels: labels.into_iter().map(ClusterLabel::new).collect(),
            shifts,
            distances,
        }
    }
}
