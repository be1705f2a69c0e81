//! Damped approach toward a target
//!
//! `value' = value + (target - value) * rate`, applied once per frame.

use std::ops::{Add, Mul, Sub};

/// Exponential smoothing step for anything that supports linear blending
/// (`f32`, `glam::Vec3`, ...).
pub trait Approach: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {
    /// Move a fraction `rate` of the way to `target`
    #[inline]
    fn approach(&mut self, target: Self, rate: f32) {
        *self = *self + (target - *self) * rate;
    }
}

impl<T> Approach for T where T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    #[test]
    fn test_approach_f32() {
        let mut v = 8.0_f32;
        v.approach(2.0, 0.08);
        assert!((v - (8.0 * 0.92 + 2.0 * 0.08)).abs() < 1e-6);
    }

    #[test]
    fn test_approach_vec3_converges() {
        let mut c = Vec3::new(1.0, 0.98, 0.8);
        for _ in 0..2000 {
            c.approach(Vec3::ONE, 0.02);
        }
        assert!((c - Vec3::ONE).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn approach_never_overshoots(
            start in -100.0f32..100.0,
            target in -100.0f32..100.0,
            rate in 0.001f32..0.99,
        ) {
            let mut v = start;
            let before = (target - v).abs();
            v.approach(target, rate);
            let after = (target - v).abs();
            prop_assert!(after <= before + 1e-4);
            // Stays on the same side of the target
            prop_assert!((target - v) * (target - start) >= -1e-2);
        }
    }
}
