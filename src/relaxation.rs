use nalgebra::DVector;

use crate::Float;

/// BGK relaxation increment: `omega * (f_eq - f)`.
///
/// The caller adds the result to `f`. With `omega == 1` the site is driven
/// straight onto `f_eq` in a single step.
pub fn bgk_update(omega: Float, f: &DVector<Float>, f_eq: &DVector<Float>) -> DVector<Float> {
    (f_eq - f) * omega
}
