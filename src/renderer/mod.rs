//! WebGPU rendering module
//!
//! Draws the effect overlay: light glow in a fullscreen fragment pass, then
//! particles as instanced billboards shaped in the fragment shader.

pub mod fx_pipeline;
pub mod instance;

pub use fx_pipeline::FxRenderState;
pub use instance::{Globals, ParticleInstance, build_instances};
