//! Cluster-count scan scored with βCV.

use tracing::{debug, info, instrument, warn};

use inflow_shape::Sequence;

use crate::beta_cv::{centroid_beta_cv, pairwise_beta_cv};
use crate::config::{BetaCvMethod, ScanConfig};
use crate::error::ClusterError;
use crate::ksc::multi_restart;
use crate::result::{ScoreCurve, ScorePoint};

/// Cluster and score every k in `[config.min_k, config.max_k)`.
///
/// Under [`BetaCvMethod::Pairwise`] the pairwise distance matrix is computed
/// once and reused for every k. Values of k whose βCV is undefined are
/// listed in [`ScoreCurve::omitted`] rather than scored.
///
/// # Errors
///
/// Propagates the first [`ClusterError`] from any k value.
#[instrument(skip(sequences, config), fields(min_k = config.min_k, max_k = config.max_k, method = %config.method))]
pub(crate) fn scan(sequences: &[Sequence], config: &ScanConfig) -> Result<ScoreCurve, ClusterError> {
    let distance = config.distance();
    let matrix = match config.method {
        BetaCvMethod::Pairwise => {
            debug!("precomputing pairwise shape distances");
            Some(distance.pairwise(sequences)?)
        }
        BetaCvMethod::Centroid => None,
    };

    let mut points = Vec::with_capacity(config.max_k - config.min_k);
    let mut omitted = Vec::new();

    for k in config.min_k..config.max_k {
        let result = multi_restart(sequences, &config.ksc_config(k))?;
        let beta_cv = match &matrix {
            Some(m) => pairwise_beta_cv(result.labels(), m),
            None => centroid_beta_cv(&result, &distance)?,
        };

        match beta_cv {
            Some(beta_cv) => {
                debug!(k, beta_cv, objective = result.objective.value(), "k scored");
                points.push(ScorePoint {
                    k,
                    beta_cv,
                    objective: result.objective,
                    converged: result.converged,
                });
            }
            None if k == 1 => {
                debug!("k=1 has no inter-cluster distances, omitting");
                omitted.push(k);
            }
            None => {
                warn!(k, "inter-cluster distances have no spread, βCV undefined");
                omitted.push(k);
            }
        }
    }

    info!(scored = points.len(), omitted = omitted.len(), "scan complete");

    Ok(ScoreCurve {
        method: config.method,
        points,
        omitted,
    })
}

#[cfg(test)]
mod tests {
    use inflow_shape::{Sequence, ShiftBound};

    use crate::config::{BetaCvMethod, ScanConfig};

    fn seq(values: &[f64]) -> Sequence {
        Sequence::new(values.to_vec()).unwrap()
    }

    fn two_shapes() -> Vec<Sequence> {
        vec![
            seq(&[0.1, 0.1, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            seq(&[0.1, 0.2, 1.1, 2.0, 3.2, 4.0, 5.1, 6.0]),
            seq(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.1, 0.1]),
            seq(&[6.2, 5.0, 4.1, 3.0, 1.9, 1.0, 0.2, 0.1]),
        ]
    }

    #[test]
    fn k_one_is_omitted() {
        let curve = ScanConfig::new(1, 3, ShiftBound::Unbounded)
            .unwrap()
            .with_method(BetaCvMethod::Pairwise)
            .fit(&two_shapes())
            .unwrap();
        assert!(curve.get(1).is_none());
        assert!(curve.omitted.contains(&1));
        let k2 = curve.get(2).expect("k=2 must be scored under the pairwise method");
        assert!(k2.beta_cv.is_finite());
    }

    #[test]
    fn points_ascend_in_k() {
        let curve = ScanConfig::new(2, 5, ShiftBound::Unbounded)
            .unwrap()
            .with_method(BetaCvMethod::Pairwise)
            .with_n_init(3)
            .fit(&two_shapes())
            .unwrap();
        let ks: Vec<usize> = curve.points.iter().map(|p| p.k).collect();
        let mut sorted = ks.clone();
        sorted.sort_unstable();
        assert_eq!(ks, sorted);
        assert_eq!(curve.points.len() + curve.omitted.len(), 3);
        assert_eq!(curve.method, BetaCvMethod::Pairwise);
    }

    #[test]
    fn k_two_scored_by_default() {
        let curve = ScanConfig::new(2, 4, ShiftBound::Unbounded)
            .unwrap()
            .fit(&two_shapes())
            .unwrap();
        assert_eq!(curve.method, BetaCvMethod::Pairwise);
        assert!(!curve.omitted.contains(&2), "omitted: {:?}", curve.omitted);
        let k2 = curve.get(2).expect("k=2 must be scored by default");
        assert!(k2.beta_cv.is_finite());
    }

    #[test]
    fn centroid_method_omits_k_two() {
        let curve = ScanConfig::new(2, 3, ShiftBound::Unbounded)
            .unwrap()
            .with_method(BetaCvMethod::Centroid)
            .fit(&two_shapes())
            .unwrap();
        assert!(curve.points.is_empty());
        assert_eq!(curve.omitted, vec![2]);
    }

    #[test]
    fn too_few_sequences_for_largest_k() {
        let result = ScanConfig::new(2, 6, ShiftBound::Unbounded)
            .unwrap()
            .fit(&two_shapes());
        assert!(result.is_err());
    }
}
