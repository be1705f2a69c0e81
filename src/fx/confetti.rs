//! Confetti emitter: rotating pieces that rain down and bounce on a floor

use glam::Vec3;
use rand::Rng;

use super::palette;
use super::particles::{EmitterConfig, KindPhysics, ParticleSeed};
use super::random::uniform;
use crate::consts::{CONFETTI_FLOOR, CONFETTI_LIFETIME};

/// Confetti piece shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfettiShape {
    Round = 0,
    /// Drifts slowly and bounces highest
    Heart = 1,
    Diamond = 2,
}

impl ConfettiShape {
    pub const ALL: [ConfettiShape; 3] = [
        ConfettiShape::Round,
        ConfettiShape::Heart,
        ConfettiShape::Diamond,
    ];
}

/// Indexed by `ConfettiShape as usize`
const PHYSICS: [KindPhysics; 3] = [
    KindPhysics { drag: 0.98, gravity_scale: 1.0, restitution: 0.5 },
    KindPhysics { drag: 0.995, gravity_scale: 0.6, restitution: 0.7 },
    KindPhysics { drag: 0.99, gravity_scale: 0.8, restitution: 0.6 },
];

/// Shader shape ids 0-2 belong to the burst
const SHADER_SHAPE_OFFSET: u32 = 3;

const SPAWN_HEIGHT: f32 = 15.0;
const SPAWN_HALF_WIDTH: f32 = 20.0;
const SPAWN_HALF_DEPTH: f32 = 10.0;
const SPIN_MAX: f32 = 0.2;
const SIZE_MIN: f32 = 0.12;
const SIZE_MAX: f32 = 0.3;
const FADE_RATE: f32 = 0.15;

/// Confetti emitter config
pub struct Confetti;

impl EmitterConfig for Confetti {
    type Shape = ConfettiShape;

    const NAME: &'static str = "confetti";
    const LIFETIME: f32 = CONFETTI_LIFETIME;
    // Only horizontal motion is damped; pieces keep accelerating downward
    const DRAG_AXES: Vec3 = Vec3::new(1.0, 0.0, 1.0);
    const FLOOR: Option<f32> = Some(CONFETTI_FLOOR);
    const SPINS: bool = true;

    fn physics(shape: ConfettiShape) -> KindPhysics {
        PHYSICS[shape as usize]
    }

    fn opacity(elapsed: f32) -> f32 {
        (1.0 - elapsed * FADE_RATE).max(0.0)
    }

    fn seed<R: Rng + ?Sized>(index: usize, rng: &mut R) -> ParticleSeed<ConfettiShape> {
        ParticleSeed {
            position: Vec3::new(
                uniform(rng, -SPAWN_HALF_WIDTH, SPAWN_HALF_WIDTH),
                SPAWN_HEIGHT,
                uniform(rng, -SPAWN_HALF_DEPTH, SPAWN_HALF_DEPTH),
            ),
            velocity: Vec3::new(
                uniform(rng, -2.0, 2.0),
                uniform(rng, -8.0, -4.0),
                uniform(rng, -1.0, 1.0),
            ),
            color: palette::CONFETTI[index % palette::CONFETTI.len()],
            size: uniform(rng, SIZE_MIN, SIZE_MAX),
            shape: ConfettiShape::ALL[rng.random_range(0..ConfettiShape::ALL.len())],
            spin: Vec3::new(
                uniform(rng, -SPIN_MAX, SPIN_MAX),
                uniform(rng, -SPIN_MAX, SPIN_MAX),
                uniform(rng, -SPIN_MAX, SPIN_MAX),
            ),
        }
    }

    fn shader_shape(shape: ConfettiShape) -> u32 {
        SHADER_SHAPE_OFFSET + shape as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::fx::ParticleSystem;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_seed_band_and_downward_velocity() {
        let mut rng = Pcg32::seed_from_u64(8);
        let sys = ParticleSystem::<Confetti>::new(200, &mut rng);
        assert_eq!(sys.rotations.len(), 200);
        assert_eq!(sys.rotation_speeds.len(), 200);
        for i in 0..sys.len() {
            let p = sys.positions[i];
            assert_eq!(p.y, SPAWN_HEIGHT);
            assert!(p.x.abs() <= SPAWN_HALF_WIDTH && p.z.abs() <= SPAWN_HALF_DEPTH);
            assert!(sys.velocities[i].y < -4.0 + EPS);
            assert!(sys.rotation_speeds[i].abs().max_element() <= SPIN_MAX);
        }
    }

    #[test]
    fn test_heart_bounces_highest() {
        let heart = Confetti::physics(ConfettiShape::Heart);
        for shape in ConfettiShape::ALL {
            let phys = Confetti::physics(shape);
            assert!(phys.restitution < 1.0);
            assert!(phys.restitution <= heart.restitution);
        }
    }

    #[test]
    fn test_shader_shapes_do_not_overlap_burst() {
        for shape in ConfettiShape::ALL {
            assert!(Confetti::shader_shape(shape) >= 3);
        }
    }

    #[test]
    fn test_opacity_reaches_zero_within_lifetime() {
        assert_eq!(Confetti::opacity(0.0), 1.0);
        assert_eq!(Confetti::opacity(Confetti::LIFETIME), 0.0);
    }

    #[test]
    fn test_pieces_reach_the_floor_and_bounce() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut sys = ParticleSystem::<Confetti>::new(50, &mut rng);
        sys.arm(&mut rng);
        let mut touched = vec![false; sys.len()];
        for _ in 0..300 {
            sys.advance(FRAME_DT);
            for (i, p) in sys.positions.iter().enumerate() {
                if (p.y - CONFETTI_FLOOR).abs() < EPS {
                    touched[i] = true;
                }
            }
        }
        assert!(touched.iter().all(|&t| t), "some confetti never landed");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn confetti_never_rests_below_floor(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut sys = ParticleSystem::<Confetti>::new(40, &mut rng);
            sys.arm(&mut rng);
            while sys.advance(FRAME_DT) {
                for p in &sys.positions {
                    prop_assert!(p.y >= CONFETTI_FLOOR - EPS, "y = {}", p.y);
                }
            }
        }

        #[test]
        fn confetti_opacity_is_non_increasing(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut sys = ParticleSystem::<Confetti>::new(4, &mut rng);
            sys.arm(&mut rng);
            let mut prev = sys.opacity();
            while sys.advance(FRAME_DT) {
                prop_assert!(sys.opacity() <= prev);
                prev = sys.opacity();
            }
            prop_assert_eq!(sys.opacity(), 0.0);
            prop_assert!(!sys.visible());
        }
    }
}
