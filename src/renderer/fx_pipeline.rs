//! Effect render pipeline
//!
//! Two passes share one uniform buffer: a fullscreen glow for the lights and
//! instanced billboards for the particles (confetti alpha-blended, burst
//! additive).

use rand::Rng;
use wgpu::util::DeviceExt;

use super::instance::{Globals, InstanceRanges, ParticleInstance, build_instances};
use crate::error::FxError;
use crate::fx::AnimationSession;
use crate::platform::clamp_to_limit;

/// Vertices per billboard
const SPRITE_VERTICES: u32 = 6;

/// Adds source onto destination; inputs are premultiplied
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

struct PipelineDesc<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    blend: wgpu::BlendState,
}

pub struct FxRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    glow_pipeline: wgpu::RenderPipeline,
    confetti_pipeline: wgpu::RenderPipeline,
    burst_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    /// Instances the buffer can hold
    instance_capacity: usize,
    /// Reused every frame
    instances: Vec<ParticleInstance>,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    /// Largest surface side the device accepts
    max_dimension: u32,
}

impl FxRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        capacity: usize,
    ) -> Result<Self, FxError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("fx-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_to_limit((width, height), max_dimension);

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(FxError::SurfaceUnsupported)?;

        // The canvas overlays the page, so keep the clear transparent
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .find(|m| **m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| surface_caps.alpha_modes.first())
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format {:?}, alpha {:?}", surface_format, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fx_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("fx_shader.wgsl").into()),
        });

        let initial: Globals = bytemuck::Zeroable::zeroed();
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let instance_capacity = capacity.max(1);
        let instance_buffer = Self::create_instance_buffer(&device, instance_capacity);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fx_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fx_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fx_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let particle_buffers = [ParticleInstance::desc()];
        let make_pipeline = |label, vs, fs, buffers: &[wgpu::VertexBufferLayout<'static>], blend| {
            Self::create_pipeline(
                &device,
                &pipeline_layout,
                &shader,
                config.format,
                PipelineDesc {
                    label,
                    vs,
                    fs,
                    buffers,
                    blend,
                },
            )
        };

        // No vertex buffers - fullscreen triangle
        let glow_pipeline = make_pipeline("glow_pipeline", "vs_glow", "fs_glow", &[], ADDITIVE);
        let confetti_pipeline = make_pipeline(
            "confetti_pipeline",
            "vs_particle",
            "fs_particle",
            &particle_buffers,
            wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
        );
        let burst_pipeline = make_pipeline(
            "burst_pipeline",
            "vs_particle",
            "fs_particle",
            &particle_buffers,
            ADDITIVE,
        );

        log::info!("Render state ready: {}x{}, {} instances", width, height, instance_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            glow_pipeline,
            confetti_pipeline,
            burst_pipeline,
            globals_buffer,
            instance_buffer,
            instance_capacity,
            instances: Vec::with_capacity(instance_capacity),
            bind_group,
            size: (width, height),
            max_dimension,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        desc: PipelineDesc<'_>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(desc.vs),
                buffers: desc.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(desc.fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(desc.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instances"),
            size: (std::mem::size_of::<ParticleInstance>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Size the surface would actually get for a requested size
    pub fn fit(&self, size: (u32, u32)) -> (u32, u32) {
        clamp_to_limit(size, self.max_dimension)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            let (new_width, new_height) = self.fit((new_width, new_height));
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapply the current configuration after a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload session state and draw one frame
    pub fn render<R: Rng>(&mut self, session: &AnimationSession<R>, time_ms: f64) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::from_session(session, self.size, time_ms);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let ranges = build_instances(session, &mut self.instances);
        if self.instances.len() > self.instance_capacity {
            self.instance_capacity = self.instances.len();
            self.instance_buffer = Self::create_instance_buffer(&self.device, self.instance_capacity);
            log::info!("Instance buffer grown to {}", self.instance_capacity);
        }
        if !self.instances.is_empty() {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&self.instances),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fx_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fx_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            if session.options().lights {
                render_pass.set_pipeline(&self.glow_pipeline);
                render_pass.draw(0..3, 0..1); // Fullscreen triangle
            }

            let InstanceRanges { confetti, burst } = ranges;
            if !confetti.is_empty() || !burst.is_empty() {
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
            }
            if !confetti.is_empty() {
                render_pass.set_pipeline(&self.confetti_pipeline);
                render_pass.draw(0..SPRITE_VERTICES, confetti);
            }
            if !burst.is_empty() {
                render_pass.set_pipeline(&self.burst_pipeline);
                render_pass.draw(0..SPRITE_VERTICES, burst);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
