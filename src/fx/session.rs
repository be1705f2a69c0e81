//! Animation session: the single owner of all mutable effect state
//!
//! The platform layer holds one `AnimationSession` while running and calls
//! `advance()` from the frame callback. Triggers (`tension`, `celebrate`)
//! and option changes land between frames.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::burst::Burst;
use super::camera::CameraDirector;
use super::confetti::Confetti;
use super::lighting::LightingDirector;
use super::particles::ParticleSystem;
use crate::consts::{BURST_COUNT, CONFETTI_COUNT};

/// Which sub-effects react to triggers and animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectOptions {
    pub lights: bool,
    pub particles: bool,
    pub camera: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            lights: true,
            particles: true,
            camera: true,
        }
    }
}

impl EffectOptions {
    /// Overwrite only the fields present in `patch`
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(lights) = patch.lights {
            self.lights = lights;
        }
        if let Some(particles) = patch.particles {
            self.particles = particles;
        }
        if let Some(camera) = patch.camera {
            self.camera = camera;
        }
    }
}

/// Partial options update; absent fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OptionsPatch {
    #[serde(default)]
    pub lights: Option<bool>,
    #[serde(default)]
    pub particles: Option<bool>,
    #[serde(default)]
    pub camera: Option<bool>,
}

impl OptionsPatch {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Emitter populations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterCounts {
    pub burst: usize,
    pub confetti: usize,
}

impl Default for EmitterCounts {
    fn default() -> Self {
        Self {
            burst: BURST_COUNT,
            confetti: CONFETTI_COUNT,
        }
    }
}

/// Where the session is in the spin cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Wheel is spinning
    Tensioning,
    /// Effects from the last reveal are still playing
    Celebrating,
}

/// All mutable animation state
#[derive(Debug)]
pub struct AnimationSession<R: Rng> {
    options: EffectOptions,
    phase: SessionPhase,
    burst: ParticleSystem<Burst>,
    confetti: ParticleSystem<Confetti>,
    lighting: LightingDirector,
    camera: CameraDirector,
    frames: u64,
    rng: R,
}

impl<R: Rng> AnimationSession<R> {
    pub fn new(options: EffectOptions, counts: EmitterCounts, width: u32, height: u32, mut rng: R) -> Self {
        let burst = ParticleSystem::new(counts.burst, &mut rng);
        let confetti = ParticleSystem::new(counts.confetti, &mut rng);
        log::info!(
            "Animation session: {} burst, {} confetti, {}x{}",
            counts.burst,
            counts.confetti,
            width,
            height
        );

        Self {
            options,
            phase: SessionPhase::Idle,
            burst,
            confetti,
            lighting: LightingDirector::new(),
            camera: CameraDirector::new(width, height),
            frames: 0,
            rng,
        }
    }

    pub fn options(&self) -> EffectOptions {
        self.options
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn burst(&self) -> &ParticleSystem<Burst> {
        &self.burst
    }

    pub fn confetti(&self) -> &ParticleSystem<Confetti> {
        &self.confetti
    }

    pub fn lighting(&self) -> &LightingDirector {
        &self.lighting
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.camera
    }

    /// Frames advanced since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn counts(&self) -> EmitterCounts {
        EmitterCounts {
            burst: self.burst.len(),
            confetti: self.confetti.len(),
        }
    }

    /// Replace the options wholesale; takes effect on the next frame
    pub fn set_options(&mut self, options: EffectOptions) {
        if options != self.options {
            log::debug!("Effect options: {:?}", options);
        }
        self.options = options;
    }

    pub fn merge_options(&mut self, patch: OptionsPatch) {
        let mut options = self.options;
        options.merge(patch);
        self.set_options(options);
    }

    /// Rebuild emitter populations. In-flight particles are discarded.
    pub fn set_counts(&mut self, counts: EmitterCounts) {
        if counts == self.counts() {
            return;
        }
        self.burst = ParticleSystem::new(counts.burst, &mut self.rng);
        self.confetti = ParticleSystem::new(counts.confetti, &mut self.rng);
        log::info!("Emitter counts: {} burst, {} confetti", counts.burst, counts.confetti);
    }

    /// Viewport change; touches nothing but the camera aspect
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Wheel started spinning
    pub fn tension(&mut self) {
        log::debug!("tension");
        self.phase = SessionPhase::Tensioning;
        if self.options.lights {
            self.lighting.tension();
        }
    }

    /// Wheel stopped: arm emitters and flash lights and camera
    pub fn celebrate(&mut self) {
        log::debug!("celebrate");
        self.phase = SessionPhase::Celebrating;
        if self.options.particles {
            self.burst.arm(&mut self.rng);
            self.confetti.arm(&mut self.rng);
        }
        if self.options.camera {
            self.camera.celebrate();
        }
        if self.options.lights {
            self.lighting.celebrate();
        }
    }

    /// Advance one frame. `dt` drives motion; `time_ms` is the wall clock
    /// used for camera oscillation phase.
    pub fn advance(&mut self, dt: f32, time_ms: f64) {
        self.frames += 1;

        // Disabled sub-effects keep their state until re-enabled
        if self.options.particles {
            self.burst.advance(dt);
            self.confetti.advance(dt);
        }
        if self.options.camera {
            self.camera.advance(dt, time_ms);
        }

        if self.options.lights {
            self.lighting.advance(dt);
        }

        if self.phase == SessionPhase::Celebrating && self.is_settled() {
            log::debug!("celebration finished after {} frames", self.frames);
            self.phase = SessionPhase::Idle;
        }
    }

    /// No emitter visible and no camera budget left
    pub fn is_settled(&self) -> bool {
        !self.burst.visible() && !self.confetti.visible() && self.camera.is_settled()
    }
}
