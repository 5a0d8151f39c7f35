//! Initial centroid selection.

use rand::seq::index;
use rand_chacha::ChaCha8Rng;

/// Pick `k` distinct sequence indices uniformly at random without replacement.
///
/// Index `c` of the returned vector seeds cluster `c`. Deterministic for a
/// given RNG state.
#[must_use]
pub(crate) fn uniform_seeds(n: usize, k: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    debug_assert!(k >= 1 && k <= n, "need 1 <= k <= n, got k={k}, n={n}");
    index::sample(rng, n, k).into_vec()
}
