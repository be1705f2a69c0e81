//! Generic particle emitter
//!
//! `ParticleSystem<C>` owns a fixed population stored as parallel arrays
//! (slot `i` of every array is the same particle). The emitter config `C`
//! decides how particles are seeded, which physics constants each shape kind
//! uses, how opacity fades and how long a burst lives.

use std::fmt;
use std::marker::PhantomData;

use glam::Vec3;
use rand::Rng;

use crate::consts::{FRAME_DT, GRAVITY, IMPACT_SPIN_DAMPING};

/// Motion constants for one shape kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindPhysics {
    /// Per-frame velocity multiplier (< 1)
    pub drag: f32,
    /// Multiplier on `GRAVITY`
    pub gravity_scale: f32,
    /// Fraction of vertical speed kept on a floor bounce (< 1)
    pub restitution: f32,
}

/// Initial state for one particle
#[derive(Debug, Clone, Copy)]
pub struct ParticleSeed<S> {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
    pub size: f32,
    pub shape: S,
    /// Radians per nominal frame, ignored unless the emitter spins
    pub spin: Vec3,
}

/// Static description of an emitter
pub trait EmitterConfig {
    /// Closed set of shape kinds this emitter draws
    type Shape: Copy + PartialEq + fmt::Debug;

    /// Name used in logs
    const NAME: &'static str;
    /// Seconds of nominal time before the emitter hides itself
    const LIFETIME: f32;
    /// Which velocity axes drag applies to (1 = damped, 0 = free)
    const DRAG_AXES: Vec3;
    /// Height particles bounce off, if any
    const FLOOR: Option<f32>;
    /// Whether particles carry a rotation
    const SPINS: bool;

    /// Physics table lookup
    fn physics(shape: Self::Shape) -> KindPhysics;

    /// Opacity after `elapsed` seconds; non-increasing and zero by `LIFETIME`
    fn opacity(elapsed: f32) -> f32;

    /// Seed particle `index`
    fn seed<R: Rng + ?Sized>(index: usize, rng: &mut R) -> ParticleSeed<Self::Shape>;

    /// Shape id understood by the particle shader
    fn shader_shape(shape: Self::Shape) -> u32;
}

/// Fixed-population particle emitter
pub struct ParticleSystem<C: EmitterConfig> {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub shapes: Vec<C::Shape>,
    /// Empty unless `C::SPINS`
    pub rotations: Vec<Vec3>,
    /// Empty unless `C::SPINS`
    pub rotation_speeds: Vec<Vec3>,
    visible: bool,
    elapsed: f32,
    opacity: f32,
    _config: PhantomData<C>,
}

impl<C: EmitterConfig> ParticleSystem<C> {
    /// Create a hidden emitter with `count` seeded particles
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let spin_len = if C::SPINS { count } else { 0 };
        let mut system = Self {
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            shapes: Vec::with_capacity(count),
            rotations: Vec::with_capacity(spin_len),
            rotation_speeds: Vec::with_capacity(spin_len),
            visible: false,
            elapsed: 0.0,
            opacity: 0.0,
            _config: PhantomData,
        };
        system.reseed(count, rng);
        system
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Seconds since the last arm (0 while hidden)
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Discard all in-flight state, reseed every particle and show the emitter
    pub fn arm<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let count = self.len();
        self.reseed(count, rng);
        self.visible = true;
        self.elapsed = 0.0;
        self.opacity = 1.0;
        log::debug!("{} armed with {} particles", C::NAME, count);
    }

    fn reseed<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.positions.clear();
        self.velocities.clear();
        self.colors.clear();
        self.sizes.clear();
        self.shapes.clear();
        self.rotations.clear();
        self.rotation_speeds.clear();

        for i in 0..count {
            let seed = C::seed(i, rng);
            self.positions.push(seed.position);
            self.velocities.push(seed.velocity);
            self.colors.push(seed.color);
            self.sizes.push(seed.size);
            self.shapes.push(seed.shape);
            if C::SPINS {
                self.rotations.push(Vec3::ZERO);
                self.rotation_speeds.push(seed.spin);
            }
        }
    }

    /// Advance one frame. Returns whether the emitter is still visible.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.visible {
            return false;
        }

        self.elapsed += dt;
        self.integrate(dt);

        self.opacity = C::opacity(self.elapsed).clamp(0.0, 1.0);
        if self.elapsed > C::LIFETIME {
            log::debug!("{} finished", C::NAME);
            self.visible = false;
            self.elapsed = 0.0;
            self.opacity = 0.0;
        }
        self.visible
    }

    fn integrate(&mut self, dt: f32) {
        // Spin speeds are per nominal frame
        let spin_scale = dt / FRAME_DT;

        for i in 0..self.positions.len() {
            let phys = C::physics(self.shapes[i]);
            let drag = Vec3::ONE - C::DRAG_AXES * (1.0 - phys.drag);

            let mut vel = self.velocities[i] * drag;
            vel.y += GRAVITY * phys.gravity_scale * dt;
            let mut pos = self.positions[i] + vel * dt;

            if C::SPINS {
                self.rotations[i] += self.rotation_speeds[i] * spin_scale;
            }

            if let Some(floor) = C::FLOOR {
                if pos.y < floor && vel.y < 0.0 {
                    pos.y = floor;
                    vel.y = vel.y.abs() * phys.restitution;
                    if C::SPINS {
                        self.rotation_speeds[i] *= IMPACT_SPIN_DAMPING;
                    }
                }
            }

            self.velocities[i] = vel;
            self.positions[i] = pos;
        }
    }
}

impl<C: EmitterConfig> fmt::Debug for ParticleSystem<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("emitter", &C::NAME)
            .field("len", &self.len())
            .field("visible", &self.visible)
            .field("elapsed", &self.elapsed)
            .field("opacity", &self.opacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Minimal emitter: everything starts at rest one unit above a floor at 0
    struct Pebble;

    impl EmitterConfig for Pebble {
        type Shape = u8;
        const NAME: &'static str = "pebble";
        const LIFETIME: f32 = 1.0;
        const DRAG_AXES: Vec3 = Vec3::ONE;
        const FLOOR: Option<f32> = Some(0.0);
        const SPINS: bool = true;

        fn physics(_shape: u8) -> KindPhysics {
            KindPhysics {
                drag: 1.0,
                gravity_scale: 10.0,
                restitution: 0.5,
            }
        }

        fn opacity(elapsed: f32) -> f32 {
            1.0 - elapsed
        }

        fn seed<R: Rng + ?Sized>(index: usize, _rng: &mut R) -> ParticleSeed<u8> {
            ParticleSeed {
                position: Vec3::new(index as f32, 1.0, 0.0),
                velocity: Vec3::ZERO,
                color: Vec3::ONE,
                size: 1.0,
                shape: 0,
                spin: Vec3::splat(0.1),
            }
        }

        fn shader_shape(_shape: u8) -> u32 {
            0
        }
    }

    #[test]
    fn test_new_is_hidden_and_sized() {
        let mut rng = Pcg32::seed_from_u64(1);
        let sys = ParticleSystem::<Pebble>::new(5, &mut rng);
        assert_eq!(sys.len(), 5);
        assert_eq!(sys.rotations.len(), 5);
        assert!(!sys.visible());
        assert_eq!(sys.opacity(), 0.0);
    }

    #[test]
    fn test_hidden_emitter_does_not_move() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sys = ParticleSystem::<Pebble>::new(3, &mut rng);
        let before = sys.positions.clone();
        assert!(!sys.advance(FRAME_DT));
        assert_eq!(sys.positions, before);
    }

    #[test]
    fn test_bounce_reflects_and_damps_spin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sys = ParticleSystem::<Pebble>::new(1, &mut rng);
        sys.arm(&mut rng);

        let mut bounced = false;
        for _ in 0..40 {
            sys.advance(FRAME_DT);
            assert!(sys.positions[0].y >= 0.0);
            if sys.velocities[0].y > 0.0 {
                bounced = true;
                assert!(sys.rotation_speeds[0].x < 0.1);
                break;
            }
        }
        assert!(bounced, "pebble never reached the floor");
    }

    #[test]
    fn test_lifetime_hides_and_resets() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sys = ParticleSystem::<Pebble>::new(2, &mut rng);
        sys.arm(&mut rng);
        let mut frames = 0;
        while sys.advance(FRAME_DT) {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(!sys.visible());
        assert_eq!(sys.elapsed(), 0.0);
        assert_eq!(sys.opacity(), 0.0);
        // 1.0 s at 16 ms per frame
        assert!((62..=63).contains(&frames), "frames = {}", frames);
    }
}
