//! K-Spectral-Centroid clustering loop.
//!
//! Provides the assign/refit loop with empty-cluster re-seeding and the
//! multi-restart orchestration used by [`KscConfig::fit`] and the βCV scan.

use std::cmp::{Ordering, Reverse};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use inflow_shape::{Sequence, ShapeDistance};

use crate::assignment::Assignment;
use crate::centroid::refit_all;
use crate::config::KscConfig;
use crate::error::ClusterError;
use crate::init::uniform_seeds;
use crate::label::ClusterLabel;
use crate::result::ClusteringResult;

/// Relative margin inside which two distances count as tied during re-seeding.
const TIE_TOLERANCE: f64 = 1e-9;

// ── Internal run result ───────────────────────────────────────────────────────

/// Result of a single restart.
struct SingleRun {
    assignment: Assignment,
    centroids: Vec<Sequence>,
    converged: bool,
    iterations: usize,
    reseeds: usize,
}

// ── rescue_empty ──────────────────────────────────────────────────────────────

/// Give every empty cluster one member before refitting.
///
/// The donor is the largest cluster (lowest id on ties); the member moved is
/// its highest-distance sequence, with near-ties broken uniformly at random
/// through `rng`. The moved sequence joins at shift 0 and becomes its new
/// cluster's sole member. Returns the number of clusters re-seeded.
///
/// With at least as many sequences as clusters an empty cluster implies a
/// donor of two or more members, so every empty cluster is filled.
pub(crate) fn rescue_empty(
    groups: &mut [Vec<usize>],
    distances: &[f64],
    shifts: &mut [isize],
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut reseeds = 0;

    for empty in 0..groups.len() {
        if !groups[empty].is_empty() {
            continue;
        }

        let Some(donor) = (0..groups.len()).max_by_key(|&c| (groups[c].len(), Reverse(c))) else {
            break;
        };
        if groups[donor].len() < 2 {
            break;
        }

        let worst = groups[donor]
            .iter()
            .map(|&i| distances[i])
            .fold(f64::NEG_INFINITY, f64::max);
        let margin = TIE_TOLERANCE * worst.abs().max(1.0);
        let candidates: Vec<usize> = groups[donor]
            .iter()
            .copied()
            .filter(|&i| distances[i] >= worst - margin)
            .collect();
        let stolen = match candidates.as_slice() {
            [only] => *only,
            _ => candidates[rng.gen_range(0..candidates.len())],
        };

        groups[donor].retain(|&i| i != stolen);
        groups[empty].push(stolen);
        shifts[stolen] = 0;
        reseeds += 1;

        debug!(
            empty_cluster = empty,
            donor_cluster = donor,
            stolen_sequence = stolen,
            distance = distances[stolen],
            tied = candidates.len(),
            "re-seeded empty cluster"
        );
    }

    reseeds
}

// ── run_once ──────────────────────────────────────────────────────────────────

/// Run a single restart seeded with `seed`.
///
/// At least one assignment round is always performed. The loop stops when an
/// assignment round reproduces the previous round's labels, or after
/// `max_iter` rounds; in both cases the returned assignment was computed
/// against the returned centroids.
///
/// # Errors
///
/// Propagates [`ClusterError::Shape`] from alignment.
#[instrument(skip(sequences, config, distance), fields(k = config.k, seed))]
fn run_once(
    sequences: &[Sequence],
    config: &KscConfig,
    distance: &ShapeDistance,
    seed: u64,
) -> Result<SingleRun, ClusterError> {
    let k = config.k;
    let max_iter = config.max_iter.max(1);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut centroids: Vec<Sequence> = uniform_seeds(sequences.len(), k, &mut rng)
        .into_iter()
        .map(|i| sequences[i].clone())
        .collect();

    let mut previous: Option<Vec<ClusterLabel>> = None;
    let mut converged = false;
    let mut iterations = 0usize;
    let mut reseeds = 0usize;

    let assignment = loop {
        iterations += 1;
        let current = Assignment::compute(sequences, &centroids, distance)?;

        if previous.as_deref() == Some(current.labels()) {
            converged = true;
            debug!(iteration = iterations, "converged");
            break current;
        }
        if iterations >= max_iter {
            break current;
        }

        let mut groups = current.groups(k);
        let mut shifts = current.shifts().to_vec();
        reseeds += rescue_empty(&mut groups, current.distances(), &mut shifts, &mut rng);
        centroids = refit_all(sequences, &groups, &shifts, distance)?;

        debug!(
            iteration = iterations,
            objective = current.objective().value(),
            "iteration complete"
        );
        previous = Some(current.labels().to_vec());
    };

    info!(
        seed,
        iterations,
        objective = assignment.objective().value(),
        converged,
        reseeds,
        "single restart complete"
    );

    Ok(SingleRun {
        assignment,
        centroids,
        converged,
        iterations,
        reseeds,
    })
}

// ── multi_restart ─────────────────────────────────────────────────────────────

/// Run `config.n_init` independent restarts and return the best result.
///
/// Restarts execute in parallel. Sub-seeds are drawn from a generator seeded
/// with `config.seed`, and results are compared in restart order, so the
/// outcome does not depend on thread count. The lowest objective wins; ties
/// go to the earliest restart.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ClusterError::DidNotConverge`] | `config.strict` is set and the best restart did not converge |
/// | [`ClusterError::Shape`] | Alignment failed |
#[instrument(skip(sequences, config), fields(k = config.k, n_init = config.n_init))]
pub(crate) fn multi_restart(
    sequences: &[Sequence],
    config: &KscConfig,
) -> Result<ClusteringResult, ClusterError> {
    let distance = config.distance();

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let first_seed: u64 = master_rng.r#gen();
    let other_seeds: Vec<u64> = (1..config.n_init.max(1)).map(|_| master_rng.r#gen()).collect();
    let n_init = other_seeds.len() + 1;

    let (first, others) = rayon::join(
        || run_once(sequences, config, &distance, first_seed),
        || {
            other_seeds
                .into_par_iter()
                .map(|seed| run_once(sequences, config, &distance, seed))
                .collect::<Result<Vec<_>, _>>()
        },
    );

    let best = others?.into_iter().fold(first?, |best, run| {
        let ord = run.assignment.objective().total_cmp(&best.assignment.objective());
        if ord == Ordering::Less { run } else { best }
    });

    if !best.converged {
        if config.strict {
            return Err(ClusterError::DidNotConverge { k: config.k, max_iter: config.max_iter });
        }
        warn!(k = config.k, max_iter = config.max_iter, "best restart hit max_iter without converging");
    }

    let objective = best.assignment.objective();
    info!(
        k = config.k,
        n_init,
        best_objective = objective.value(),
        converged = best.converged,
        "multi-restart complete"
    );

    Ok(ClusteringResult {
        assignment: best.assignment,
        centroids: best.centroids,
        objective,
        converged: best.converged,
        iterations: best.iterations,
        reseeds: best.reseeds,
        restarts_used: n_init,
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────
