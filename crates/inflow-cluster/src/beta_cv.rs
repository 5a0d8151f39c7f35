//! βCV: intra-cluster over inter-cluster coefficient of variation.

use inflow_shape::{DistanceMatrix, ShapeDistance};

use crate::error::ClusterError;
use crate::label::ClusterLabel;
use crate::result::ClusteringResult;

/// Mean below which a distance population is treated as all zeros.
const ZERO_MEAN: f64 = 1e-9;

/// Inter-cluster CV at or below which βCV is undefined.
const CV_FLOOR: f64 = 1e-12;

/// Population standard deviation divided by the mean.
///
/// Empty populations and populations whose mean is zero within tolerance
/// have a CV of zero.
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= ZERO_MEAN {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

/// `CV(intra) / CV(inter)`, or `None` when the inter population has no spread.
fn ratio(intra: &[f64], inter: &[f64]) -> Option<f64> {
    let cv_inter = coefficient_of_variation(inter);
    if inter.is_empty() || cv_inter <= CV_FLOOR {
        return None;
    }
    Some(coefficient_of_variation(intra) / cv_inter)
}

/// βCV from each sequence's distance to its centroid (intra) and the
/// distances between all centroid pairs (inter).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ClusterError::Shape`] | Centroids differ in length |
pub(crate) fn centroid_beta_cv(
    result: &ClusteringResult,
    distance: &ShapeDistance,
) -> Result<Option<f64>, ClusterError> {
    let centroids = &result.centroids;
    let mut inter = Vec::with_capacity(centroids.len() * centroids.len().saturating_sub(1) / 2);
    for i in 1..centroids.len() {
        for j in 0..i {
            inter.push(distance.align(centroids[i].as_view(), centroids[j].as_view())?.distance());
        }
    }
    Ok(ratio(result.assignment.distances(), &inter))
}

/// βCV from distances between sequences sharing a cluster (intra) and
/// sequences in different clusters (inter).
///
/// Single-member clusters contribute no intra pairs.
pub(crate) fn pairwise_beta_cv(labels: &[ClusterLabel], matrix: &DistanceMatrix) -> Option<f64> {
    let (intra, inter): (Vec<_>, Vec<_>) = matrix
        .iter()
        .partition(|&(i, j, _)| labels[i] == labels[j]);
    let intra: Vec<f64> = intra.into_iter().map(|(_, _, a)| a.distance()).collect();
    let inter: Vec<f64> = inter.into_iter().map(|(_, _, a)| a.distance()).collect();
    ratio(&intra, &inter)
}
