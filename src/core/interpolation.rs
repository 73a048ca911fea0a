use num_traits::{Float, FloatConst};
use std::ops::{Add, Mul};

/// Trait for interpolation between two values
pub trait Interpolator<T, V>
where
    T: Float + Copy,
    V: Copy + Add<Output = V> + Mul<T, Output = V>,
{
    /// Blend `a` and `b`, where `alpha = 0` yields `a` and `alpha = 1` yields `b`.
    fn interpolate(&self, alpha: T, a: &V, b: &V) -> V;
}

/// Cosine interpolation: the blend weight follows `(1 - cos(alpha * pi)) / 2`,
/// which eases in and out of both end points.
#[derive(Default, Clone, Copy, Debug)]
pub struct CosineInterpolator;

impl CosineInterpolator {
    pub fn weight<T: Float + FloatConst>(alpha: T) -> T {
        let two = T::one() + T::one();
        (T::one() - (alpha * T::PI()).cos()) / two
    }
}

impl<T, V> Interpolator<T, V> for CosineInterpolator
where
    T: Float + FloatConst + Copy,
    V: Copy + Add<Output = V> + Mul<T, Output = V>,
{
    fn interpolate(&self, alpha: T, a: &V, b: &V) -> V {
        let weight = Self::weight(alpha);
        *a * (T::one() - weight) + *b * weight
    }
}

/// Linear interpolation on integer values using wrapping 32-bit arithmetic:
/// `a * (1 - alpha) + b * alpha`. Only `alpha` in {0, 1} selects an end point;
/// any other value wraps around.
pub fn wrapping_linear_interpolation(a: u32, b: u32, alpha: u32) -> u32 {
    a.wrapping_mul(1u32.wrapping_sub(alpha))
        .wrapping_add(b.wrapping_mul(alpha))
}
