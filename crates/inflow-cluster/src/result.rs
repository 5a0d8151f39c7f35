//! Result types for clustering runs and βCV scans.

use inflow_shape::Sequence;

use crate::assignment::Assignment;
use crate::config::BetaCvMethod;
use crate::label::ClusterLabel;
use crate::objective::Objective;

/// Immutable snapshot of a finished clustering run.
///
/// `assignment` was computed against `centroids`, so every shift and
/// distance refers to the returned centroid of that sequence's cluster.
#[derive(Debug, Clone)]
pub struct ClusteringResult {
    /// Label, best shift and distance of each input sequence.
    pub assignment: Assignment,
    /// Centroid of each cluster, ordered by cluster id.
    pub centroids: Vec<Sequence>,
    /// Sum of squared distances to assigned centroids.
    pub objective: Objective,
    /// Whether assignments stopped changing before the iteration cap.
    pub converged: bool,
    /// Number of assignment rounds performed in the winning restart.
    pub iterations: usize,
    /// Number of empty clusters re-seeded in the winning restart.
    pub reseeds: usize,
    /// Number of restarts executed.
    pub restarts_used: usize,
}

impl ClusteringResult {
    /// Return the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Cluster label of each input sequence.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        self.assignment.labels()
    }

    /// Number of sequences assigned to each cluster, indexed by cluster id.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for label in self.labels() {
            sizes[label.index()] += 1;
        }
        sizes
    }

    /// Indices of all sequences assigned to `label`, in input order.
    #[must_use]
    pub fn members(&self, label: ClusterLabel) -> Vec<usize> {
        self.labels()
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == label).then_some(i))
            .collect()
    }

    /// Return true if at least one empty cluster had to be re-seeded.
    #[must_use]
    pub fn reseeded(&self) -> bool {
        self.reseeds > 0
    }
}

/// βCV score for one cluster count.
#[derive(Debug, Clone)]
pub struct ScorePoint {
    /// Number of clusters.
    pub k: usize,
    /// CV of intra-cluster distances divided by CV of inter-cluster distances.
    pub beta_cv: f64,
    /// Objective of the clustering that was scored.
    pub objective: Objective,
    /// Whether that clustering converged.
    pub converged: bool,
}

/// βCV for each scanned k, ordered by ascending k.
#[derive(Debug, Clone)]
pub struct ScoreCurve {
    /// How the distance populations were formed.
    pub method: BetaCvMethod,
    /// Scored cluster counts.
    pub points: Vec<ScorePoint>,
    /// Cluster counts for which βCV is undefined (always includes k = 1 when scanned).
    pub omitted: Vec<usize>,
}

impl ScoreCurve {
    /// Return the point for `k`, if it was scored.
    #[must_use]
    pub fn get(&self, k: usize) -> Option<&ScorePoint> {
        self.points.iter().find(|p| p.k == k)
    }

    /// Return the scored `(k, βCV)` pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(usize, f64)> {
        self.points.iter().map(|p| (p.k, p.beta_cv)).collect()
    }

    /// Return the number of scored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if no k could be scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
