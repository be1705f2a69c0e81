//! Fortune FX - celebration effects for a fortune wheel
//!
//! Core modules:
//! - `fx`: Effect engine (emitters, physics, lighting, camera, session state)
//! - `renderer`: WebGPU render pipeline
//! - `platform`: Browser controller and surface handling
//! - `wheel`: Weighted draw and spin timing that trigger the effects
//! - `settings`: Persisted preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod fx;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod wheel;

pub use error::FxError;
pub use fx::{AnimationSession, EffectOptions, OptionsPatch, SessionPhase};
pub use settings::{QualityPreset, Settings};

use glam::Vec3;

/// Engine configuration constants
pub mod consts {
    /// Nominal per-frame timestep. Motion advances by this amount every frame
    /// regardless of the real frame interval.
    pub const FRAME_DT: f32 = 0.016;

    /// Downward acceleration shared by both emitters (scaled per shape kind)
    pub const GRAVITY: f32 = -9.8 * 0.15;

    /// Default emitter populations (Medium quality)
    pub const BURST_COUNT: usize = 1200;
    pub const CONFETTI_COUNT: usize = 200;

    /// Emitter lifetimes in seconds of nominal time
    pub const BURST_LIFETIME: f32 = 3.5;
    pub const CONFETTI_LIFETIME: f32 = 8.0;

    /// Confetti bounces off this height
    pub const CONFETTI_FLOOR: f32 = -8.0;
    /// Spin retained by confetti after each bounce
    pub const IMPACT_SPIN_DAMPING: f32 = 0.8;

    /// Camera rest distance along +Z and projection
    pub const CAMERA_DISTANCE: f32 = 12.0;
    pub const CAMERA_FOV_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 100.0;

    /// Fallback drawable size when the container reports zero
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;

    /// Upper bound on how long `start()` may wait for the GPU context
    pub const START_TIMEOUT_MS: u32 = 10_000;
}

/// Convert a 0xRRGGBB color to linear-ish RGB in [0, 1]
#[inline]
pub const fn hex_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Normalize degrees to [0, 360)
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgb() {
        let c = hex_rgb(0xff8000);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!((normalize_degrees(365.5) - 5.5).abs() < 1e-9);
    }
}
