//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Drawable size (container size, device pixel ratio cap)
//! - The JS-facing controller and its frame loop (web only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Drawing-buffer size for a container of `css_width x css_height` CSS
/// pixels. A zero-sized container falls back to the default size; the
/// device pixel ratio is capped at `max_ratio`.
pub fn surface_size(css_width: f64, css_height: f64, device_ratio: f64, max_ratio: f64) -> (u32, u32) {
    let (w, h) = if css_width > 0.0 && css_height > 0.0 {
        (css_width, css_height)
    } else {
        (DEFAULT_WIDTH as f64, DEFAULT_HEIGHT as f64)
    };
    let ratio = if device_ratio > 0.0 { device_ratio } else { 1.0 };
    let ratio = ratio.min(max_ratio.max(1.0));

    (
        ((w * ratio).round() as u32).max(1),
        ((h * ratio).round() as u32).max(1),
    )
}

/// Scale `size` down, keeping its aspect, until neither side exceeds
/// `max_dimension` (the device's texture limit).
pub fn clamp_to_limit(size: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    let (w, h) = (size.0.max(1), size.1.max(1));
    let longest = w.max(h);
    if longest <= max_dimension {
        return (w, h);
    }
    let scale = |side: u32| ((side as u64 * max_dimension as u64 / longest as u64) as u32).max(1);
    (scale(w), scale(h))
}
