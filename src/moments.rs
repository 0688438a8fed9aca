//! Velocity moments of a site's populations.

use std::iter::Sum;

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::{lattice::VelocitySet, Float};

/// Densities below this are treated as vacuum when dividing out momentum.
pub const DENSITY_FLOOR: Float = 1e-10;

#[derive(Debug, Error, PartialEq)]
pub enum MomentsError {
    #[error("cannot combine a vector of length {vector} with a matrix of {columns} columns")]
    DimensionMismatch { vector: usize, columns: usize },
}

/// Weighted combination of the columns of `matrix`: row `r` of the result is
/// `sum_c matrix[(r, c)] * vector[c]`.
pub fn combine(vector: &DVector<Float>, matrix: &DMatrix<Float>) -> Result<DVector<Float>, MomentsError> {
    if vector.len() != matrix.ncols() {
        return Err(MomentsError::DimensionMismatch {
            vector: vector.len(),
            columns: matrix.ncols(),
        });
    }
    Ok(matrix * vector)
}

pub fn total<T, I>(values: I) -> T
where
    T: Sum<T>,
    I: IntoIterator<Item = T>,
{
    values.into_iter().sum()
}

/// Zeroth moment.
pub fn density(f: &DVector<Float>) -> Float {
    total(f.iter().copied())
}

/// First moment, one component per spatial dimension.
pub fn momentum(velocity_set: &VelocitySet, f: &DVector<Float>) -> Result<DVector<Float>, MomentsError> {
    combine(f, velocity_set.velocities())
}

/// Macroscopic velocity. Returns zero for a site with no mass.
pub fn velocity(velocity_set: &VelocitySet, f: &DVector<Float>) -> Result<DVector<Float>, MomentsError> {
    let rho = density(f);
    let m = momentum(velocity_set, f)?;
    if rho > DENSITY_FLOOR {
        Ok(m / rho)
    } else {
        Ok(DVector::zeros(m.len()))
    }
}
