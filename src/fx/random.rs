//! Random sampling helpers
//!
//! The draw and the particle seeding both use an OS-seeded CSPRNG in
//! production. Tests and the native demo pass a seeded PCG instead.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FxError;

/// Create a generator seeded from the operating system's secure source
pub fn secure_rng() -> Result<StdRng, FxError> {
    StdRng::try_from_os_rng().map_err(|e| FxError::Entropy(e.to_string()))
}

/// Uniform value in [min, max). Returns `min` for an empty range.
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Unit vector distributed uniformly over the sphere's surface.
///
/// The polar angle comes from `acos(1 - 2u)` so that `cos(phi)` is uniform
/// on [-1, 1]; sampling `phi` itself uniformly would bunch directions at
/// the poles.
pub fn sphere_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}
