//! GPU data layouts and the CPU-side packing that fills them

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::fx::lighting::{Light, POINT_LIGHTS};
use crate::fx::{AnimationSession, EmitterConfig, ParticleSystem};

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

/// One billboard, drawn as two triangles
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3], // offset 0
    pub size: f32,          // offset 12
    pub color: [f32; 3],    // offset 16
    pub opacity: f32,       // offset 28
    pub shape: u32,         // offset 32
    pub rotation: f32,      // offset 36 - radians about the view axis
    pub _pad: [f32; 2],     // pad to 48 bytes
}

impl ParticleInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x3,
        3 => Float32,
        4 => Uint32,
        5 => Float32,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub position: [f32; 4], // w = range
    pub color: [f32; 4],    // w = intensity
}

impl From<&Light> for GpuLight {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.extend(light.range).to_array(),
            color: light.color.extend(light.intensity).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],         // offset 0
    pub resolution: [f32; 2],             // offset 64
    pub time: f32,                        // offset 72
    pub lights_on: f32,                   // offset 76 - 0 disables glow and tint
    pub ambient: [f32; 4],                // offset 80 - w = intensity
    pub spot: GpuLight,                   // offset 96
    pub spot_cone: [f32; 4],              // offset 128 - x = cos(outer), y = cos(inner)
    pub points: [GpuLight; POINT_LIGHTS], // offset 144
}

impl Globals {
    /// Snapshot the session's camera and lights
    pub fn from_session<R: Rng>(session: &AnimationSession<R>, size: (u32, u32), time_ms: f64) -> Self {
        let lighting = session.lighting();
        let spot = &lighting.spot;
        let outer = spot.angle;
        let inner = outer * (1.0 - spot.penumbra.clamp(0.0, 1.0));

        Self {
            view_proj: session.camera().view_proj().to_cols_array_2d(),
            resolution: [size.0 as f32, size.1 as f32],
            time: (time_ms / 1000.0) as f32,
            lights_on: if session.options().lights { 1.0 } else { 0.0 },
            ambient: lighting
                .ambient
                .color
                .extend(lighting.ambient.intensity)
                .to_array(),
            spot: GpuLight::from(&spot.light),
            spot_cone: [outer.cos(), inner.cos(), 0.0, 0.0],
            points: std::array::from_fn(|i| GpuLight::from(&lighting.points[i])),
        }
    }
}

/// Append one instance per particle of a visible emitter
pub fn push_instances<C: EmitterConfig>(out: &mut Vec<ParticleInstance>, system: &ParticleSystem<C>) {
    if !system.visible() {
        return;
    }
    let opacity = system.opacity();
    for i in 0..system.len() {
        out.push(ParticleInstance {
            position: system.positions[i].to_array(),
            size: system.sizes[i],
            color: system.colors[i].to_array(),
            opacity,
            shape: C::shader_shape(system.shapes[i]),
            rotation: if C::SPINS { system.rotations[i].z } else { 0.0 },
            _pad: [0.0; 2],
        });
    }
}

/// Instance ranges for one frame: confetti first, burst second
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceRanges {
    pub confetti: std::ops::Range<u32>,
    pub burst: std::ops::Range<u32>,
}

impl InstanceRanges {
    pub fn total(&self) -> u32 {
        self.burst.end
    }
}

/// Pack every drawable particle of the session into `out`
pub fn build_instances<R: Rng>(session: &AnimationSession<R>, out: &mut Vec<ParticleInstance>) -> InstanceRanges {
    out.clear();
    if !session.options().particles {
        return InstanceRanges::default();
    }
    push_instances(out, session.confetti());
    let confetti_end = out.len() as u32;
    push_instances(out, session.burst());
    InstanceRanges {
        confetti: 0..confetti_end,
        burst: confetti_end..out.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::{EffectOptions, EmitterCounts};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session(options: EffectOptions) -> AnimationSession<Pcg32> {
        AnimationSession::new(
            options,
            EmitterCounts {
                burst: 30,
                confetti: 12,
            },
            800,
            600,
            Pcg32::seed_from_u64(5),
        )
    }

    #[test]
    fn test_layout_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 48);
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::size_of::<Globals>(), 272);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn test_hidden_session_draws_nothing() {
        let s = session(EffectOptions::default());
        let mut out = Vec::new();
        let ranges = build_instances(&s, &mut out);
        assert!(out.is_empty());
        assert_eq!(ranges.total(), 0);
    }

    #[test]
    fn test_celebrating_session_packs_both_emitters() {
        let mut s = session(EffectOptions::default());
        s.celebrate();
        let mut out = Vec::new();
        let ranges = build_instances(&s, &mut out);
        assert_eq!(ranges.confetti, 0..12);
        assert_eq!(ranges.burst, 12..42);
        assert_eq!(out.len(), 42);
        assert!(out[..12].iter().all(|p| p.shape >= 3));
        assert!(out[12..].iter().all(|p| p.shape < 3 && p.rotation == 0.0));
        assert!(out.iter().all(|p| p.opacity == 1.0));
    }

    #[test]
    fn test_globals_reflect_light_toggle() {
        let mut s = session(EffectOptions::default());
        let on = Globals::from_session(&s, (800, 600), 1500.0);
        assert_eq!(on.lights_on, 1.0);
        assert_eq!(on.time, 1.5);
        assert!(on.spot_cone[1] >= on.spot_cone[0], "inner cone must be narrower");

        s.set_options(EffectOptions {
            lights: false,
            ..Default::default()
        });
        assert_eq!(Globals::from_session(&s, (800, 600), 0.0).lights_on, 0.0);
    }
}
