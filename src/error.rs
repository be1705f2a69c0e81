//! Error types for context acquisition and host input

use thiserror::Error;

/// Errors surfaced by `start()` and by the JSON entry points.
///
/// Nothing in the per-frame path returns these; frame faults are logged and
/// the frame is skipped.
#[derive(Error, Debug)]
pub enum FxError {
    /// No browser window/document available
    #[error("no window or document available")]
    NoWindow,

    /// The container element could not be found or used
    #[error("container unavailable: {0}")]
    Container(String),

    /// A DOM call failed while building the canvas
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// Failed to create a surface on the canvas
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter can drive the surface
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to create a device
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable formats
    #[error("surface is not supported by the adapter")]
    SurfaceUnsupported,

    /// Context acquisition did not finish in time
    #[error("rendering context not ready after {0} ms")]
    Timeout(u32),

    /// The OS random source could not seed the generator
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// Malformed options JSON
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    /// Malformed or empty item list
    #[error("invalid wheel items: {0}")]
    Items(String),
}

#[cfg(target_arch = "wasm32")]
impl From<FxError> for wasm_bindgen::JsValue {
    fn from(err: FxError) -> Self {
        wasm_bindgen::JsError::new(&err.to_string()).into()
    }
}
