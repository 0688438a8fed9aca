use nalgebra::DVector;

use crate::{relaxation, Float};

/// Local collision step. Returns the increment to add to the site's populations.
pub trait CollisionOperator {
    fn collide(&self, f: &DVector<Float>, f_eq: &DVector<Float>) -> DVector<Float>;
}

/// Single-relaxation-time operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bgk {
    pub omega: Float,
}

impl Bgk {
    pub fn new(omega: Float) -> Self {
        Self { omega }
    }

    pub fn from_tau(tau: Float) -> Self {
        Self { omega: 1.0 / tau }
    }
}

impl CollisionOperator for Bgk {
    fn collide(&self, f: &DVector<Float>, f_eq: &DVector<Float>) -> DVector<Float> {
        relaxation::bgk_update(self.omega, f, f_eq)
    }
}
