use crate::{Scalar, Vec2};
use std::ops::Range;

/// `n` evenly spaced samples from `start` to `end`, both ends included.
pub fn linspace(start: Scalar, end: Scalar, n: usize) -> impl Iterator<Item = Scalar> {
    let step = if n > 1 {
        (end - start) / (n - 1) as Scalar
    } else {
        0.
    };
    (0..n).map(move |i| start + step * i as Scalar)
}

pub trait VecExt {
    fn all_finite(&self) -> bool;

    /// Inclusive on both ends, unlike `Range::contains`.
    fn within(&self, range: &Range<Scalar>) -> bool;
}

impl VecExt for Vec2 {
    fn all_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn within(&self, range: &Range<Scalar>) -> bool {
        self.iter().all(|&c| range.start <= c && c <= range.end)
    }
}
