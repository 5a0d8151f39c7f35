//! Centroid refit from shift-aligned members.
//!
//! Each member's overlap with the old centroid is z-normalized and placed at
//! the centroid weeks it was paired with. The top eigenvector of the scatter
//! matrix of those vectors is the shape candidate. A constant candidate at
//! the members' mean level competes with it: flat inflow normalizes to the
//! zero vector, so a cluster of mostly flat members is better served by a
//! flat centroid than by any shape.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rayon::prelude::*;
use tracing::{instrument, trace};

use inflow_shape::{Sequence, ShapeDistance};

use crate::error::ClusterError;

/// Largest eigenvalue at or below which the members carry no shape.
const EIGEN_TOLERANCE: f64 = 1e-9;

/// Relative margin inside which the constant candidate wins a near-tie.
const FLAT_PREFERENCE: f64 = 1e-9;

/// Refit every cluster in parallel. `groups` must all be non-empty.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ClusterError::Shape`] | A member differs in length from the centroid |
pub(crate) fn refit_all(
    sequences: &[Sequence],
    groups: &[Vec<usize>],
    shifts: &[isize],
    distance: &ShapeDistance,
) -> Result<Vec<Sequence>, ClusterError> {
    groups
        .par_iter()
        .map(|members| refit(sequences, members, shifts, distance))
        .collect()
}

/// Refit one cluster's centroid from its members and their shifts.
#[instrument(level = "trace", skip_all, fields(members = members.len()))]
pub(crate) fn refit(
    sequences: &[Sequence],
    members: &[usize],
    shifts: &[isize],
    distance: &ShapeDistance,
) -> Result<Sequence, ClusterError> {
    debug_assert!(!members.is_empty(), "refit needs at least one member");
    let len = sequences[members[0]].len();

    let flat = flat_candidate(sequences, members, len)?;
    let Some(shape) = spectral_candidate(sequences, members, shifts, distance, len)? else {
        return Ok(flat);
    };

    let flat_cost = cost(&flat, sequences, members, distance)?;
    let shape_cost = cost(&shape, sequences, members, distance)?;
    trace!(flat_cost, shape_cost, "centroid candidates");

    if flat_cost <= shape_cost + FLAT_PREFERENCE * shape_cost.max(1.0) {
        Ok(flat)
    } else {
        Ok(shape)
    }
}

fn flat_candidate(sequences: &[Sequence], members: &[usize], len: usize) -> Result<Sequence, ClusterError> {
    let total: f64 = members.iter().map(|&i| sequences[i].as_ref().iter().sum::<f64>()).sum();
    let level = total / (members.len() * len) as f64;
    Ok(Sequence::constant(len, level)?)
}

fn spectral_candidate(
    sequences: &[Sequence],
    members: &[usize],
    shifts: &[isize],
    distance: &ShapeDistance,
    len: usize,
) -> Result<Option<Sequence>, ClusterError> {
    let mut scatter = DMatrix::<f64>::zeros(len, len);
    let mut mean = DVector::<f64>::zeros(len);
    for &i in members {
        let v = DVector::from_vec(distance.project(sequences[i].as_view(), shifts[i]));
        scatter += &v * v.transpose();
        mean += v;
    }

    let eigen = SymmetricEigen::new(scatter);
    let Some((top, &lambda)) = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    else {
        return Ok(None);
    };
    if lambda <= EIGEN_TOLERANCE {
        return Ok(None);
    }

    let mut values: Vec<f64> = eigen.eigenvectors.column(top).iter().copied().collect();
    // eigenvectors are defined up to sign
    let agreement: f64 = values.iter().zip(mean.iter()).map(|(c, m)| c * m).sum();
    if agreement < 0.0 {
        values.iter_mut().for_each(|v| *v = -*v);
    }
    Ok(Some(Sequence::new(values)?))
}

fn cost(
    candidate: &Sequence,
    sequences: &[Sequence],
    members: &[usize],
    distance: &ShapeDistance,
) -> Result<f64, ClusterError> {
    members.iter().try_fold(0.0, |acc, &i| {
        let d = distance.align(candidate.as_view(), sequences[i].as_view())?.distance();
        Ok(acc + d * d)
    })
}
