use crate::{Scalar, Vec2};

/// Fraction of the interaction radius inside which every pair repels, regardless of species.
pub const BETA: Scalar = 0.3;

/// The radial force law.
///
/// `r` is the distance between two particles divided by the interaction radius, so the
/// interesting domain is `[0, 1]`. `a` is the interaction coefficient between their species.
///
/// ```text
/// force
///   a |              /\
///     |            /    \
///   0 +-----------/------\------- r
///     |      /  beta      1
///  -1 | /
/// ```
///
/// Below `BETA` the force ramps linearly from -1 up to 0, then forms a tent that peaks at `a`
/// halfway between `BETA` and 1, and is zero from the cutoff onwards.
#[inline]
pub fn force(r: Scalar, a: Scalar) -> Scalar {
    if r < BETA {
        r / BETA - 1.
    } else if r < 1. {
        a * (1. - (2. * r - 1. - BETA).abs() / (1. - BETA))
    } else {
        0.
    }
}

/// The (unscaled) force on a particle from a neighbour displaced by `delta`.
///
/// Returns `None` if the neighbour is at or beyond `r_max`, or sits exactly on top of the
/// particle, since there is no direction to push in.
#[inline]
pub fn pair_force(delta: Vec2, r_max: Scalar, a: Scalar) -> Option<Vec2> {
    let r = delta.norm();
    if r > 0. && r < r_max {
        Some(delta / r * force(r / r_max, a))
    } else {
        None
    }
}
