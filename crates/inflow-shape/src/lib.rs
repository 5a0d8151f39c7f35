//! Shift-aligned shape distance between equal-length sequences.
//!
//! Pure math library, zero I/O. A [`ShapeDistance`] slides one sequence
//! against another, z-normalizes each overlapping segment independently and
//! keeps the shift with the smallest mean squared difference. Pairwise
//! distances over a whole dataset are collected into a [`DistanceMatrix`].

mod alignment;
mod bound;
mod error;
mod matrix;
mod normalize;
mod sequence;
mod shape;

pub use alignment::Alignment;
pub use bound::ShiftBound;
pub use error::ShapeError;
pub use matrix::DistanceMatrix;
pub use normalize::{FLAT_TOLERANCE, is_flat, z_normalize};
pub use sequence::{Sequence, SequenceView};
pub use shape::{ShapeDistance, overlap};
