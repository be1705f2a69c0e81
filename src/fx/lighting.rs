//! Dynamic lights
//!
//! One ambient light, one spot light and a ring of point lights. Every frame
//! the spot and points are pulled toward sine oscillators; `tension()` and
//! `celebrate()` hard-set flash values that the same smoothing then eases
//! back out.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, TAU};

use glam::Vec3;

use super::palette;
use super::smoothing::Approach;

/// Number of auxiliary point lights
pub const POINT_LIGHTS: usize = 4;

const AMBIENT_INTENSITY: f32 = 0.4;

const SPOT_HOME: Vec3 = Vec3::new(0.0, 8.0, 12.0);
const SPOT_BASE_INTENSITY: f32 = 2.0;
const SPOT_SWING: f32 = 0.8;
const SPOT_ANGLE: f32 = FRAC_PI_6;
const SPOT_PENUMBRA: f32 = 0.3;
const SPOT_RANGE: f32 = 50.0;

const SPOT_INTENSITY_RATE: f32 = 0.08;
const SPOT_COLOR_RATE: f32 = 0.02;
const SPOT_SHAPE_RATE: f32 = 0.05;
const POINT_INTENSITY_RATE: f32 = 0.05;

const TENSION_INTENSITY: f32 = 3.5;
const TENSION_PENUMBRA: f32 = 0.9;
const FLASH_INTENSITY: f32 = 8.0;
const FLASH_ANGLE: f32 = FRAC_PI_4;

const POINT_BASE_INTENSITY: f32 = 0.8;
const POINT_FLASH_INTENSITY: f32 = 2.0;
const POINT_RANGE: f32 = 20.0;
const POINT_ORBIT_RADIUS: f32 = 15.0;

/// A colored light at a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    /// Distance at which the light fades out (0 = unbounded)
    pub range: f32,
}

/// Spot light aimed at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub light: Light,
    /// Cone half-angle in radians
    pub angle: f32,
    /// Soft edge fraction in [0, 1]
    pub penumbra: f32,
}

/// Owns and animates all scene lights
#[derive(Debug, Clone)]
pub struct LightingDirector {
    pub ambient: Light,
    pub spot: SpotLight,
    pub points: [Light; POINT_LIGHTS],
    /// Spot oscillator phase (seconds)
    pulse_t: f32,
    /// Point light oscillator phase
    light_pulse: f32,
}

impl Default for LightingDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingDirector {
    pub fn new() -> Self {
        let points = std::array::from_fn(|i| {
            let angle = (i as f32 / POINT_LIGHTS as f32) * TAU;
            Light {
                color: palette::LIGHTS[i % palette::LIGHTS.len()],
                intensity: POINT_BASE_INTENSITY,
                position: Vec3::new(
                    angle.cos() * POINT_ORBIT_RADIUS,
                    3.0 + angle.sin() * 2.0,
                    angle.sin() * 8.0,
                ),
                range: POINT_RANGE,
            }
        });

        Self {
            ambient: Light {
                color: palette::WHITE,
                intensity: AMBIENT_INTENSITY,
                position: Vec3::ZERO,
                range: 0.0,
            },
            spot: SpotLight {
                light: Light {
                    color: palette::WHITE,
                    intensity: SPOT_BASE_INTENSITY,
                    position: SPOT_HOME,
                    range: SPOT_RANGE,
                },
                angle: SPOT_ANGLE,
                penumbra: SPOT_PENUMBRA,
            },
            points,
            pulse_t: 0.0,
            light_pulse: 0.0,
        }
    }

    /// Idle target for the spot intensity at the current phase
    pub fn spot_target(&self) -> f32 {
        SPOT_BASE_INTENSITY + (self.pulse_t * 2.5).sin() * SPOT_SWING
    }

    /// Idle target for point light `i` at the current phase
    pub fn point_target(&self, i: usize) -> f32 {
        let pulse = (self.light_pulse + i as f32 * FRAC_PI_2).sin() * 0.3 + 0.7;
        POINT_BASE_INTENSITY * pulse
    }

    /// Advance oscillators one frame and ease everything toward them
    pub fn advance(&mut self, dt: f32) {
        self.pulse_t += dt;
        self.light_pulse += dt * 2.0;

        let target = self.spot_target();
        let spot = &mut self.spot;
        spot.light.intensity.approach(target, SPOT_INTENSITY_RATE);
        spot.light.color.approach(palette::WHITE, SPOT_COLOR_RATE);
        spot.angle.approach(SPOT_ANGLE, SPOT_SHAPE_RATE);
        spot.penumbra.approach(SPOT_PENUMBRA, SPOT_SHAPE_RATE);
        spot.light.position.x = (self.pulse_t * 0.7).sin() * 3.0;
        spot.light.position.y = SPOT_HOME.y + (self.pulse_t * 1.1).cos() * 1.2;

        for i in 0..POINT_LIGHTS {
            let target = self.point_target(i);
            let angle = (i as f32 / POINT_LIGHTS as f32) * TAU + self.light_pulse * 0.3;
            let light = &mut self.points[i];
            light.intensity.approach(target, POINT_INTENSITY_RATE);
            light.position.x = angle.cos() * POINT_ORBIT_RADIUS;
            light.position.y = 3.0 + angle.sin() * 2.0;
        }
    }

    /// Pre-spin: restart the oscillators and push the spot to a tense preset
    pub fn tension(&mut self) {
        self.pulse_t = 0.0;
        self.light_pulse = 0.0;
        self.spot.light.intensity = TENSION_INTENSITY;
        self.spot.penumbra = TENSION_PENUMBRA;
    }

    /// Result reveal: warm flash on the spot, palette flash on the points
    pub fn celebrate(&mut self) {
        self.spot.light.color = palette::SPOT_FLASH;
        self.spot.light.intensity = FLASH_INTENSITY;
        self.spot.angle = FLASH_ANGLE;
        for (i, light) in self.points.iter_mut().enumerate() {
            light.color = palette::LIGHTS[i % palette::LIGHTS.len()];
            light.intensity = POINT_FLASH_INTENSITY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;

    #[test]
    fn test_idle_spot_stays_near_oscillator() {
        let mut lights = LightingDirector::new();
        for _ in 0..600 {
            lights.advance(FRAME_DT);
            let i = lights.spot.light.intensity;
            assert!(i >= SPOT_BASE_INTENSITY - SPOT_SWING - 1e-3);
            assert!(i <= SPOT_BASE_INTENSITY + SPOT_SWING + 1e-3);
        }
    }

    #[test]
    fn test_celebrate_flash_decays_gracefully() {
        let mut lights = LightingDirector::new();
        lights.celebrate();
        assert_eq!(lights.spot.light.intensity, FLASH_INTENSITY);
        assert_eq!(lights.spot.light.color, palette::SPOT_FLASH);
        assert_eq!(lights.spot.angle, FLASH_ANGLE);
        assert!(lights.points.iter().all(|p| p.intensity == POINT_FLASH_INTENSITY));

        let mut prev = lights.spot.light.intensity;
        for _ in 0..10 {
            lights.advance(FRAME_DT);
            let now = lights.spot.light.intensity;
            assert!(now < prev, "flash should ease out, not snap or grow");
            assert!(now > SPOT_BASE_INTENSITY + SPOT_SWING);
            prev = now;
        }

        for _ in 0..300 {
            lights.advance(FRAME_DT);
        }
        // Smoothing lags the moving oscillator a little
        assert!((lights.spot.light.intensity - lights.spot_target()).abs() < 0.6);
        assert!((lights.spot.angle - SPOT_ANGLE).abs() < 1e-3);
        assert!((lights.spot.light.color - palette::WHITE).length() < 0.01);
    }

    #[test]
    fn test_tension_resets_phase_and_relaxes_penumbra() {
        let mut lights = LightingDirector::new();
        for _ in 0..100 {
            lights.advance(FRAME_DT);
        }
        lights.tension();
        assert_eq!(lights.spot.light.intensity, TENSION_INTENSITY);
        assert_eq!(lights.spot.penumbra, TENSION_PENUMBRA);
        assert_eq!(lights.spot_target(), SPOT_BASE_INTENSITY);

        for _ in 0..300 {
            lights.advance(FRAME_DT);
        }
        assert!((lights.spot.penumbra - SPOT_PENUMBRA).abs() < 1e-3);
    }

    #[test]
    fn test_point_lights_orbit() {
        let mut lights = LightingDirector::new();
        let start = lights.points[0].position;
        for _ in 0..50 {
            lights.advance(FRAME_DT);
        }
        let now = lights.points[0].position;
        assert!((now - start).length() > 0.1);
        assert!(now.x.abs() <= POINT_ORBIT_RADIUS + 1e-3);
    }
}
