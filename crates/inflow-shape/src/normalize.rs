//! Segment z-normalization with a zero-variance fallback.

/// Relative standard deviation below which a segment counts as flat.
pub const FLAT_TOLERANCE: f64 = 1e-10;

fn mean_and_std(segment: &[f64]) -> (f64, f64) {
    let n = segment.len() as f64;
    let mean = segment.iter().sum::<f64>() / n;
    let variance = segment.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn flat(mean: f64, std: f64) -> bool {
    std <= FLAT_TOLERANCE * mean.abs().max(1.0)
}

/// Return true if the segment's standard deviation is zero within [`FLAT_TOLERANCE`].
#[must_use]
pub fn is_flat(segment: &[f64]) -> bool {
    let (mean, std) = mean_and_std(segment);
    flat(mean, std)
}

/// Z-normalize `segment` into `out` (same length).
///
/// Uses population standard deviation. A flat segment is only centered,
/// which yields all zeros.
pub(crate) fn z_normalize_into(segment: &[f64], out: &mut [f64]) {
    debug_assert_eq!(segment.len(), out.len());
    let (mean, std) = mean_and_std(segment);
    if flat(mean, std) {
        out.fill(0.0);
        return;
    }
    for (o, &x) in out.iter_mut().zip(segment) {
        *o = (x - mean) / std;
    }
}

/// Z-normalize a segment to zero mean and unit variance.
///
/// Flat segments come back centered (all zeros) instead of failing.
#[must_use = "returns a new normalized segment; the input is unchanged"]
pub fn z_normalize(segment: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; segment.len()];
    z_normalize_into(segment, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mean_unit_variance() {
        let z = z_normalize(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let variance = z.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12, "mean was {mean}");
        assert!((variance - 1.0).abs() < 1e-12, "variance was {variance}");
    }

    #[test]
    fn flat_segment_is_centered() {
        assert_eq!(z_normalize(&[0.1, 0.1, 0.1]), vec![0.0, 0.0, 0.0]);
        assert_eq!(z_normalize(&[2.9; 10]), vec![0.0; 10]);
    }

    #[test]
    fn affine_invariant() {
        let a = z_normalize(&[0.1, 3.0, 1.0, 7.0]);
        let b = z_normalize(&[10.2, 16.0, 12.0, 24.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12, "{x} vs {y}");
        }
    }

    #[test]
    fn flatness_detection() {
        assert!(is_flat(&[5.0, 5.0, 5.0]));
        assert!(is_flat(&[0.1]));
        assert!(!is_flat(&[0.1, 0.2]));
    }
}
