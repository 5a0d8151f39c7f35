//! Configuration builders for K-Spectral-Centroid clustering and βCV scans.

use std::fmt;

use inflow_shape::{Sequence, ShapeDistance, ShiftBound};

use crate::error::{ClusterError, InvalidInput, validate};
use crate::result::{ClusteringResult, ScoreCurve};

/// Distance populations used to compute βCV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BetaCvMethod {
    /// Intra: distances between all pairs of sequences sharing a cluster.
    /// Inter: distances between all pairs in different clusters.
    #[default]
    Pairwise,
    /// Intra: each sequence's distance to its own centroid. Inter: distances
    /// between all centroid pairs. Never scores k = 2, whose single centroid
    /// pair has no spread.
    Centroid,
}

impl fmt::Display for BetaCvMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centroid => f.write_str("centroid"),
            Self::Pairwise => f.write_str("pairwise"),
        }
    }
}

/// Configuration for K-Spectral-Centroid clustering.
///
/// Construct via [`KscConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter     | Default          |
/// |---------------|------------------|
/// | `n_init`      | 1                |
/// | `max_iter`    | 100              |
/// | `seed`        | 42               |
/// | `min_overlap` | `ceil(len / 2)`  |
/// | `strict`      | false            |
#[derive(Debug, Clone)]
pub struct KscConfig {
    pub(crate) k: usize,
    pub(crate) bound: ShiftBound,
    pub(crate) min_overlap: Option<usize>,
    pub(crate) n_init: usize,
    pub(crate) max_iter: usize,
    pub(crate) seed: u64,
    pub(crate) strict: bool,
}

impl KscConfig {
    /// Create a configuration for `k` clusters with the given shift bound.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InvalidInput::InvalidK`] | `k` is zero |
    pub fn new(k: usize, bound: ShiftBound) -> Result<Self, ClusterError> {
        if k == 0 {
            return Err(InvalidInput::InvalidK { k }.into());
        }
        Ok(Self {
            k,
            bound,
            min_overlap: None,
            n_init: 1,
            max_iter: 100,
            seed: 42,
            strict: false,
        })
    }

    /// Set the number of independent restarts; the lowest objective wins.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the maximum number of assignment rounds per restart.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the seed for initial centroid selection and empty-cluster re-seeding.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the minimum number of paired weeks for a shift to be considered.
    #[must_use]
    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = Some(min_overlap);
        self
    }

    /// Fail with [`ClusterError::DidNotConverge`] instead of returning a capped result.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Return the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Return the shift bound.
    #[must_use]
    pub fn bound(&self) -> ShiftBound {
        self.bound
    }

    /// Return the number of restarts.
    #[must_use]
    pub fn n_init(&self) -> usize {
        self.n_init
    }

    /// Return the maximum number of assignment rounds per restart.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return whether non-convergence is an error.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// The shape distance calculator these settings describe.
    #[must_use]
    pub fn distance(&self) -> ShapeDistance {
        shape_distance(self.bound, self.min_overlap)
    }

    /// Cluster `sequences` using this configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InvalidInput`] | No sequences, fewer sequences than `k`, or unequal lengths |
    /// | [`ClusterError::DidNotConverge`] | Strict mode and assignments still changing after `max_iter` rounds |
    pub fn fit(&self, sequences: &[Sequence]) -> Result<ClusteringResult, ClusterError> {
        validate(sequences, self.k)?;
        crate::ksc::multi_restart(sequences, self)
    }
}

/// Configuration for a βCV scan over cluster counts `[min_k, max_k)`.
///
/// Every k in the range is clustered with the same tuning and scored; the
/// caller picks the knee of the resulting [`ScoreCurve`].
///
/// # Defaults
///
/// | Parameter     | Default                    |
/// |---------------|----------------------------|
/// | `n_init`      | 1                          |
/// | `max_iter`    | 100                        |
/// | `seed`        | 42                         |
/// | `min_overlap` | `ceil(len / 2)`            |
/// | `strict`      | false                      |
/// | `method`      | [`BetaCvMethod::Pairwise`] |
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub(crate) min_k: usize,
    pub(crate) max_k: usize,
    pub(crate) bound: ShiftBound,
    pub(crate) min_overlap: Option<usize>,
    pub(crate) n_init: usize,
    pub(crate) max_iter: usize,
    pub(crate) seed: u64,
    pub(crate) strict: bool,
    pub(crate) method: BetaCvMethod,
}

impl ScanConfig {
    /// Create a scan over the closed-open range `[min_k, max_k)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InvalidInput::InvalidK`] | `min_k` is zero |
    /// | [`InvalidInput::InvalidKRange`] | `min_k >= max_k` |
    pub fn new(min_k: usize, max_k: usize, bound: ShiftBound) -> Result<Self, ClusterError> {
        if min_k == 0 {
            return Err(InvalidInput::InvalidK { k: min_k }.into());
        }
        if min_k >= max_k {
            return Err(InvalidInput::InvalidKRange { min_k, max_k }.into());
        }
        Ok(Self {
            min_k,
            max_k,
            bound,
            min_overlap: None,
            n_init: 1,
            max_iter: 100,
            seed: 42,
            strict: false,
            method: BetaCvMethod::Pairwise,
        })
    }

    /// Set the number of restarts per k.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the maximum number of assignment rounds per restart.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the seed shared by every k.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the minimum number of paired weeks for a shift to be considered.
    #[must_use]
    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = Some(min_overlap);
        self
    }

    /// Fail on the first k that does not converge.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set how intra- and inter-cluster distance populations are formed.
    #[must_use]
    pub fn with_method(mut self, method: BetaCvMethod) -> Self {
        self.method = method;
        self
    }

    /// Return the first k scanned.
    #[must_use]
    pub fn min_k(&self) -> usize {
        self.min_k
    }

    /// Return one past the last k scanned.
    #[must_use]
    pub fn max_k(&self) -> usize {
        self.max_k
    }

    /// Return the βCV method.
    #[must_use]
    pub fn method(&self) -> BetaCvMethod {
        self.method
    }

    /// The shape distance calculator these settings describe.
    #[must_use]
    pub fn distance(&self) -> ShapeDistance {
        shape_distance(self.bound, self.min_overlap)
    }

    /// Clustering settings used for one k of the scan.
    pub(crate) fn ksc_config(&self, k: usize) -> KscConfig {
        KscConfig {
            k,
            bound: self.bound,
            min_overlap: self.min_overlap,
            n_init: self.n_init,
            max_iter: self.max_iter,
            seed: self.seed,
            strict: self.strict,
        }
    }

    /// Cluster `sequences` for every k in `[min_k, max_k)` and score each with βCV.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InvalidInput`] | No sequences, fewer sequences than `max_k - 1`, or unequal lengths |
    /// | [`ClusterError::DidNotConverge`] | Strict mode and some k did not converge |
    pub fn fit(&self, sequences: &[Sequence]) -> Result<ScoreCurve, ClusterError> {
        validate(sequences, self.max_k - 1)?;
        crate::scan::scan(sequences, self)
    }
}

fn shape_distance(bound: ShiftBound, min_overlap: Option<usize>) -> ShapeDistance {
    let distance = ShapeDistance::from_bound(bound);
    match min_overlap {
        Some(m) => distance.with_min_overlap(m),
        None => distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ksc_defaults() {
        let cfg = KscConfig::new(3, ShiftBound::Unbounded).unwrap();
        assert_eq!(cfg.k(), 3);
        assert_eq!(cfg.n_init(), 1);
        assert_eq!(cfg.max_iter(), 100);
        assert_eq!(cfg.seed(), 42);
        assert!(!cfg.strict());
        assert_eq!(cfg.distance(), ShapeDistance::unbounded());
    }

    #[test]
    fn ksc_rejects_zero_k() {
        let result = KscConfig::new(0, ShiftBound::Unbounded);
        assert!(matches!(
            result,
            Err(ClusterError::InvalidInput(InvalidInput::InvalidK { k: 0 }))
        ));
    }

    #[test]
    fn builder_overrides() {
        let cfg = KscConfig::new(2, ShiftBound::Radius(4))
            .unwrap()
            .with_n_init(5)
            .with_max_iter(10)
            .with_seed(7)
            .with_min_overlap(3)
            .with_strict(true);
        assert_eq!(cfg.n_init(), 5);
        assert_eq!(cfg.max_iter(), 10);
        assert_eq!(cfg.seed(), 7);
        assert!(cfg.strict());
        assert_eq!(cfg.distance(), ShapeDistance::with_max_shift(4).with_min_overlap(3));
    }

    #[test]
    fn scan_range_is_closed_open() {
        assert!(ScanConfig::new(2, 6, ShiftBound::Unbounded).is_ok());
        assert!(ScanConfig::new(2, 3, ShiftBound::Unbounded).is_ok());
        assert!(matches!(
            ScanConfig::new(3, 3, ShiftBound::Unbounded),
            Err(ClusterError::InvalidInput(InvalidInput::InvalidKRange { min_k: 3, max_k: 3 }))
        ));
        assert!(matches!(
            ScanConfig::new(0, 3, ShiftBound::Unbounded),
            Err(ClusterError::InvalidInput(InvalidInput::InvalidK { k: 0 }))
        ));
    }

    #[test]
    fn scan_passes_tuning_to_each_k() {
        let scan = ScanConfig::new(2, 5, ShiftBound::Radius(2))
            .unwrap()
            .with_n_init(3)
            .with_seed(9)
            .with_method(BetaCvMethod::Pairwise);
        let k4 = scan.ksc_config(4);
        assert_eq!(k4.k(), 4);
        assert_eq!(k4.n_init(), 3);
        assert_eq!(k4.seed(), 9);
        assert_eq!(k4.bound(), ShiftBound::Radius(2));
        assert_eq!(scan.method(), BetaCvMethod::Pairwise);
    }

    #[test]
    fn scan_defaults_to_pairwise() {
        let scan = ScanConfig::new(2, 5, ShiftBound::Unbounded).unwrap();
        assert_eq!(scan.method(), BetaCvMethod::Pairwise);
        assert_eq!(BetaCvMethod::default(), BetaCvMethod::Pairwise);
    }

    #[test]
    fn method_display() {
        assert_eq!(BetaCvMethod::Centroid.to_string(), "centroid");
        assert_eq!(BetaCvMethod::Pairwise.to_string(), "pairwise");
    }
}
