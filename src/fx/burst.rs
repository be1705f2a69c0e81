//! Burst emitter: an isotropic explosion from the origin

use glam::Vec3;
use rand::Rng;

use super::palette;
use super::particles::{EmitterConfig, KindPhysics, ParticleSeed};
use super::random::{sphere_direction, uniform};
use crate::consts::BURST_LIFETIME;

/// Burst particle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstShape {
    /// Falls fastest
    Round = 0,
    /// Floats
    Star = 1,
    Polygon = 2,
}

impl BurstShape {
    pub const ALL: [BurstShape; 3] = [BurstShape::Round, BurstShape::Star, BurstShape::Polygon];
}

/// Indexed by `BurstShape as usize`
const PHYSICS: [KindPhysics; 3] = [
    KindPhysics { drag: 0.98, gravity_scale: 1.2, restitution: 0.0 },
    KindPhysics { drag: 0.99, gravity_scale: 0.8, restitution: 0.0 },
    KindPhysics { drag: 0.985, gravity_scale: 1.0, restitution: 0.0 },
];

const SPEED_MIN: f32 = 8.0;
const SPEED_MAX: f32 = 18.0;
const SIZE_MIN: f32 = 0.08;
const SIZE_MAX: f32 = 0.25;
const FADE_RATE: f32 = 0.3;

/// Burst emitter config
pub struct Burst;

impl EmitterConfig for Burst {
    type Shape = BurstShape;

    const NAME: &'static str = "burst";
    const LIFETIME: f32 = BURST_LIFETIME;
    const DRAG_AXES: Vec3 = Vec3::ONE;
    const FLOOR: Option<f32> = None;
    const SPINS: bool = false;

    fn physics(shape: BurstShape) -> KindPhysics {
        PHYSICS[shape as usize]
    }

    fn opacity(elapsed: f32) -> f32 {
        (1.0 - elapsed * FADE_RATE).max(0.0)
    }

    fn seed<R: Rng + ?Sized>(index: usize, rng: &mut R) -> ParticleSeed<BurstShape> {
        let speed = uniform(rng, SPEED_MIN, SPEED_MAX);
        ParticleSeed {
            position: Vec3::ZERO,
            velocity: sphere_direction(rng) * speed,
            color: palette::BURST[index % palette::BURST.len()],
            size: uniform(rng, SIZE_MIN, SIZE_MAX),
            shape: BurstShape::ALL[rng.random_range(0..BurstShape::ALL.len())],
            spin: Vec3::ZERO,
        }
    }

    fn shader_shape(shape: BurstShape) -> u32 {
        shape as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::fx::ParticleSystem;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_seed_starts_at_origin_with_bounded_speed() {
        let mut rng = Pcg32::seed_from_u64(3);
        let sys = ParticleSystem::<Burst>::new(500, &mut rng);
        for i in 0..sys.len() {
            assert_eq!(sys.positions[i], Vec3::ZERO);
            let speed = sys.velocities[i].length();
            assert!(speed >= SPEED_MIN - 1e-3 && speed < SPEED_MAX + 1e-3);
            assert!(sys.sizes[i] >= SIZE_MIN && sys.sizes[i] < SIZE_MAX);
        }
        assert!(sys.rotations.is_empty());
    }

    #[test]
    fn test_colors_cycle_by_index() {
        let mut rng = Pcg32::seed_from_u64(3);
        let sys = ParticleSystem::<Burst>::new(25, &mut rng);
        assert_eq!(sys.colors[0], palette::BURST[0]);
        assert_eq!(sys.colors[10], palette::BURST[0]);
        assert_eq!(sys.colors[13], palette::BURST[3]);
    }

    #[test]
    fn test_all_shapes_appear() {
        let mut rng = Pcg32::seed_from_u64(11);
        let sys = ParticleSystem::<Burst>::new(300, &mut rng);
        for shape in BurstShape::ALL {
            assert!(sys.shapes.contains(&shape), "{:?} never drawn", shape);
        }
    }

    #[test]
    fn test_round_falls_harder_than_star() {
        let round = Burst::physics(BurstShape::Round);
        let star = Burst::physics(BurstShape::Star);
        assert!(round.gravity_scale > star.gravity_scale);
        assert!(round.drag < star.drag);
        for shape in BurstShape::ALL {
            assert!(Burst::physics(shape).drag < 1.0);
        }
    }

    #[test]
    fn test_opacity_reaches_zero_within_lifetime() {
        assert_eq!(Burst::opacity(0.0), 1.0);
        assert_eq!(Burst::opacity(Burst::LIFETIME), 0.0);
        let mut prev = 1.0;
        let mut t = 0.0;
        while t <= Burst::LIFETIME {
            let o = Burst::opacity(t);
            assert!(o <= prev);
            prev = o;
            t += FRAME_DT;
        }
    }

    #[test]
    fn test_burst_expands_then_drifts_down() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut sys = ParticleSystem::<Burst>::new(200, &mut rng);
        sys.arm(&mut rng);
        for _ in 0..60 {
            sys.advance(FRAME_DT);
        }
        let mean_radius: f32 =
            sys.positions.iter().map(|p| p.length()).sum::<f32>() / sys.len() as f32;
        assert!(mean_radius > 3.0, "mean radius {}", mean_radius);
        let mean_vy: f32 = sys.velocities.iter().map(|v| v.y).sum::<f32>() / sys.len() as f32;
        assert!(mean_vy < 0.0);
    }
}
