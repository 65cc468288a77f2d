use crate::math::Real;

/// The three-way sign of `x`: `-1.0`, `0.0`, or `1.0`.
///
/// Unlike `Real::signum`, an exactly zero input maps to zero.
#[inline]
pub fn sign(x: Real) -> Real {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
