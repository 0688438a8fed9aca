use nalgebra::DVector;

use crate::{
    lattice::VelocitySet,
    moments::{self, MomentsError},
    Float,
};

/// Computes the distribution a site relaxes towards.
pub trait EquilibriumProvider {
    fn equilibrium(&self, velocity_set: &VelocitySet, f: &DVector<Float>) -> Result<DVector<Float>, MomentsError>;
}

/// Second-order expansion of the Maxwell-Boltzmann distribution, built from
/// the density and velocity of the populations it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondOrderEquilibrium;

impl EquilibriumProvider for SecondOrderEquilibrium {
    fn equilibrium(&self, velocity_set: &VelocitySet, f: &DVector<Float>) -> Result<DVector<Float>, MomentsError> {
        let density = moments::density(f);
        let velocity = moments::velocity(velocity_set, f)?;
        equilibrium_distribution(velocity_set, density, &velocity)
    }
}

/// Equilibrium populations for a prescribed density and velocity.
pub fn equilibrium_distribution(
    velocity_set: &VelocitySet,
    density: Float,
    velocity: &DVector<Float>,
) -> Result<DVector<Float>, MomentsError> {
    let cs2 = VelocitySet::CS2;
    let velocities = velocity_set.velocities();
    if velocity.len() != velocities.nrows() {
        return Err(MomentsError::DimensionMismatch {
            vector: velocity.len(),
            columns: velocities.nrows(),
        });
    }

    // c_i . u for every direction
    let cu = velocities.tr_mul(velocity);
    let u2 = velocity.norm_squared();

    Ok(DVector::from_fn(velocity_set.q(), |i, _| {
        velocity_set.weights()[i]
            * density
            * (1.0 + cu[i] / cs2 + cu[i] * cu[i] / (2.0 * cs2 * cs2) - u2 / (2.0 * cs2))
    }))
}
