//! Fixed color palettes

use glam::Vec3;

use crate::hex_rgb;

/// Burst colors: pastels plus gold and silver, cycled by particle index
pub const BURST: [Vec3; 10] = [
    Vec3::new(1.0, 0.5, 0.6),
    Vec3::new(0.6, 0.8, 1.0),
    Vec3::new(1.0, 0.9, 0.6),
    Vec3::new(0.8, 0.7, 1.0),
    Vec3::new(0.7, 1.0, 0.8),
    Vec3::new(1.0, 0.8, 0.2),
    Vec3::new(0.8, 0.8, 0.8),
    Vec3::new(1.0, 0.6, 0.8),
    Vec3::new(0.6, 1.0, 0.9),
    Vec3::new(1.0, 0.7, 0.4),
];

/// Confetti colors
pub const CONFETTI: [Vec3; 8] = [
    hex_rgb(0xff6b6b),
    hex_rgb(0x4ecdc4),
    hex_rgb(0x45b7d1),
    hex_rgb(0x96ceb4),
    hex_rgb(0xfeca57),
    hex_rgb(0xff9ff3),
    hex_rgb(0xffd700),
    hex_rgb(0xff69b4),
];

/// Auxiliary point light colors
pub const LIGHTS: [Vec3; 6] = [
    hex_rgb(0xff6b6b),
    hex_rgb(0x4ecdc4),
    hex_rgb(0x45b7d1),
    hex_rgb(0x96ceb4),
    hex_rgb(0xfeca57),
    hex_rgb(0xff9ff3),
];

/// Warm highlight the spot light flashes to on celebrate
pub const SPOT_FLASH: Vec3 = hex_rgb(0xfffacd);

pub const WHITE: Vec3 = Vec3::ONE;
