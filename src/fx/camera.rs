//! Camera shake and zoom
//!
//! Two budgets decay linearly to zero. The offsets they produce depend only
//! on the remaining budget and the wall-clock phase, so a budget fully
//! determines what the effect looks like.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::{CAMERA_DISTANCE, CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR};

/// Budget set by `celebrate()`
pub const SHAKE_MAX: f32 = 1.5;
pub const ZOOM_MAX: f32 = 1.0;

/// Budget lost per second
const SHAKE_DECAY: f32 = 0.6;
const ZOOM_DECAY: f32 = 0.8;

const SHAKE_SCALE: f32 = 0.25;
const ZOOM_SCALE: f32 = 0.4;

/// Shake magnitude for a remaining budget (quadratic ease-out)
#[inline]
pub fn shake_magnitude(budget: f32) -> f32 {
    let b = budget.max(0.0);
    b * b * SHAKE_SCALE
}

/// Zoom magnitude for a remaining budget (quadratic ease-out)
#[inline]
pub fn zoom_magnitude(budget: f32) -> f32 {
    let b = budget.max(0.0);
    b * b * ZOOM_SCALE
}

/// Horizontal/vertical camera offset for a shake budget at `time_ms`
pub fn shake_offset(budget: f32, time_ms: f64) -> Vec2 {
    let mag = shake_magnitude(budget);
    Vec2::new(
        (time_ms * 0.008).sin() as f32 * mag,
        (time_ms * 0.006).cos() as f32 * mag,
    )
}

/// Offset along the viewing axis for a zoom budget at `time_ms`
pub fn zoom_offset(budget: f32, time_ms: f64) -> f32 {
    (time_ms * 0.01).sin() as f32 * zoom_magnitude(budget)
}

/// Perspective camera looking at the origin
#[derive(Debug, Clone)]
pub struct CameraDirector {
    pub position: Vec3,
    pub target: Vec3,
    /// Width / height
    pub aspect: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    shake_budget: f32,
    zoom_budget: f32,
}

impl CameraDirector {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            aspect: 1.0,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            shake_budget: 0.0,
            zoom_budget: 0.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    pub fn shake_budget(&self) -> f32 {
        self.shake_budget
    }

    pub fn zoom_budget(&self) -> f32 {
        self.zoom_budget
    }

    /// Both budgets spent
    pub fn is_settled(&self) -> bool {
        self.shake_budget == 0.0 && self.zoom_budget == 0.0
    }

    /// Update aspect ratio; zero dimensions are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Refill both budgets
    pub fn celebrate(&mut self) {
        self.shake_budget = SHAKE_MAX;
        self.zoom_budget = ZOOM_MAX;
    }

    /// Decay budgets by `dt` and place the camera for wall-clock `time_ms`
    pub fn advance(&mut self, dt: f32, time_ms: f64) {
        self.shake_budget = (self.shake_budget - dt * SHAKE_DECAY).max(0.0);
        self.zoom_budget = (self.zoom_budget - dt * ZOOM_DECAY).max(0.0);

        let shake = shake_offset(self.shake_budget, time_ms);
        self.position = Vec3::new(
            shake.x,
            shake.y,
            CAMERA_DISTANCE + zoom_offset(self.zoom_budget, time_ms),
        );
        self.target = Vec3::ZERO;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, CAMERA_NEAR, CAMERA_FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use proptest::prelude::*;

    #[test]
    fn test_budgets_decay_to_zero_and_stay_there() {
        let mut cam = CameraDirector::new(800, 600);
        cam.celebrate();
        assert_eq!(cam.shake_budget(), SHAKE_MAX);
        assert_eq!(cam.zoom_budget(), ZOOM_MAX);

        let mut prev = (cam.shake_budget(), cam.zoom_budget());
        let mut t = 0.0;
        for _ in 0..400 {
            t += 16.0;
            cam.advance(FRAME_DT, t);
            assert!(cam.shake_budget() >= 0.0 && cam.zoom_budget() >= 0.0);
            assert!(cam.shake_budget() <= prev.0 && cam.zoom_budget() <= prev.1);
            prev = (cam.shake_budget(), cam.zoom_budget());
        }
        assert!(cam.is_settled());
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, CAMERA_DISTANCE));
    }

    #[test]
    fn test_camera_always_targets_origin() {
        let mut cam = CameraDirector::new(800, 600);
        cam.celebrate();
        cam.advance(FRAME_DT, 1234.0);
        assert_eq!(cam.target, Vec3::ZERO);
        assert_ne!(cam.position.truncate(), Vec2::ZERO);
    }

    #[test]
    fn test_zero_viewport_keeps_aspect() {
        let mut cam = CameraDirector::new(1600, 800);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 800);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn test_view_proj_puts_origin_in_front() {
        let cam = CameraDirector::new(800, 600);
        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn offsets_are_deterministic_and_bounded(
            budget in 0.0f32..SHAKE_MAX,
            time in 0.0f64..1.0e6,
        ) {
            prop_assert_eq!(shake_offset(budget, time), shake_offset(budget, time));
            let s = shake_offset(budget, time);
            prop_assert!(s.x.abs() <= shake_magnitude(budget) + 1e-6);
            prop_assert!(s.y.abs() <= shake_magnitude(budget) + 1e-6);
            prop_assert!(zoom_offset(budget, time).abs() <= zoom_magnitude(budget) + 1e-6);
        }

        #[test]
        fn magnitude_shrinks_with_budget(a in 0.0f32..SHAKE_MAX, b in 0.0f32..SHAKE_MAX) {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(shake_magnitude(lo) <= shake_magnitude(hi));
            prop_assert!(zoom_magnitude(lo) <= zoom_magnitude(hi));
        }

        #[test]
        fn offsets_vanish_at_zero_budget(time in 0.0f64..1.0e6) {
            prop_assert_eq!(shake_offset(0.0, time), Vec2::ZERO);
            prop_assert_eq!(zoom_offset(0.0, time), 0.0);
        }
    }
}
