//! Effect engine
//!
//! Everything that moves lives here. This module has no rendering or
//! platform dependencies:
//! - Fixed nominal timestep only
//! - Randomness injected through `rand::Rng`
//! - All mutable state owned by `AnimationSession`

pub mod burst;
pub mod camera;
pub mod confetti;
pub mod lifecycle;
pub mod lighting;
pub mod palette;
pub mod particles;
pub mod random;
pub mod session;
pub mod smoothing;

pub use burst::{Burst, BurstShape};
pub use camera::{CameraDirector, shake_offset, zoom_offset};
pub use confetti::{Confetti, ConfettiShape};
pub use lifecycle::{Lifecycle, LifecyclePhase, StartRequest, StartTicket};
pub use lighting::{Light, LightingDirector, SpotLight};
pub use particles::{EmitterConfig, KindPhysics, ParticleSeed, ParticleSystem};
pub use session::{AnimationSession, EffectOptions, EmitterCounts, OptionsPatch, SessionPhase};
pub use smoothing::Approach;
