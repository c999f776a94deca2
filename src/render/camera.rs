// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Smoothed 2d camera.  Position and zoom chase their targets with simple
//! proportional velocities so every movement eases out; the shader reads
//! the smoothed values each frame.

use num_traits::Float;

use crate::util::{ScreenDimensions, Vec2T};

/// Zoom targets above this are clamped.
pub const MAX_CAMERA_ZOOM: f32 = 3.0;

/// World units to clip space gain shared with the vertex transform.
pub const SHADER_SCALE_FACTOR: f32 = 2.0;

/// Chase rates, per second.
const POSITION_RATE: f32 = 15.0;
const SCALE_RATE: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct CameraT<T> {
    pub pos: Vec2T<T>,
    pub scale: Vec2T<T>,
    pub target: Vec2T<T>,
    pub target_scale: Vec2T<T>,
}

pub type Camera = CameraT<f32>;

impl<T: Float + From<f32>> CameraT<T> {
    pub fn new() -> Self {
        let one = Vec2T::splat(T::one());
        Self {
            pos: Vec2T::splat(T::zero()),
            scale: one,
            target: Vec2T::splat(T::zero()),
            target_scale: one,
        }
    }

    /// Jump without easing, e.g. on scene load.
    pub fn snap_to_target(&mut self) {
        self.pos = self.target;
        self.scale = self.target_scale;
    }

    /// Advances the chase by `dt` seconds.
    pub fn update(&mut self, dt: T) {
        let position_rate: T = POSITION_RATE.into();
        let scale_rate: T = SCALE_RATE.into();
        let velocity = (self.target - self.pos) * position_rate;
        self.pos += velocity * dt;
        let scale_velocity = (self.target_scale - self.scale) * scale_rate;
        self.scale += scale_velocity * dt;
    }

    /// Retargets the camera for cursor tracking.  Zoom is clamped to
    /// [`MAX_CAMERA_ZOOM`]; below the clamp the horizontal target never
    /// drops under the zoomed view origin, so the view cannot slide off
    /// the left edge of the content.
    pub fn cursor_camera_transform(
        &mut self,
        mut target: Vec2T<T>,
        mut target_scale: Vec2T<T>,
        zoom_factor: Vec2T<T>,
    ) {
        let max: T = MAX_CAMERA_ZOOM.into();
        if target_scale.x > max {
            target_scale.x = max;
        } else if self.scale.x != T::zero() {
            let origin = zoom_factor.x / self.scale.x;
            let offset = (target.x - origin).max(T::zero());
            target.x = origin + offset;
        }
        self.target = target;
        self.target_scale = target_scale;
    }

    /// Maps a window pixel to world coordinates under the current smoothed
    /// camera.  Inverse of the camera vertex transform.
    pub fn screen_to_world_transform(
        &self,
        pixel: Vec2T<T>,
        screen: ScreenDimensions,
    ) -> Vec2T<T> {
        let two: T = 2.0f32.into();
        let one = T::one();
        let w: T = (screen.width as f32).into();
        let h: T = (screen.height as f32).into();
        let coord = Vec2T::new(two * (pixel.x / w) - one, one - two * (pixel.y / h));
        let gain: T = SHADER_SCALE_FACTOR.into();
        let divisor = gain * self.scale.x;
        self.pos + Vec2T::new(coord.x * w / divisor, coord.y * h / divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn update_moves_a_fixed_fraction_toward_target() {
        let mut cam = Camera::new();
        cam.target = Vec2T::new(100.0, 0.0);
        cam.update(0.01);
        // One step at dt covers rate * dt of the remaining distance.
        assert!(close(cam.pos.x, 15.0));
        cam.update(0.01);
        assert!(close(cam.pos.x, 15.0 + (100.0 - 15.0) * 0.15));
    }

    #[test]
    fn repeated_updates_converge() {
        let mut cam = Camera::new();
        cam.target = Vec2T::new(-40.0, 8.0);
        cam.target_scale = Vec2T::splat(2.0);
        for _ in 0..1000 {
            cam.update(1.0 / 60.0);
        }
        assert!(close(cam.pos.x, -40.0));
        assert!(close(cam.pos.y, 8.0));
        assert!(close(cam.scale.x, 2.0));
    }

    #[test]
    fn zoom_target_is_clamped() {
        let mut cam = Camera::new();
        cam.cursor_camera_transform(
            Vec2T::new(0.0, 0.0),
            Vec2T::splat(5.0),
            Vec2T::new(10.0, 0.0),
        );
        assert_eq!(cam.target_scale.x, MAX_CAMERA_ZOOM);
    }

    #[test]
    fn horizontal_target_never_precedes_the_view_origin() {
        let mut cam = Camera::new();
        cam.scale = Vec2T::splat(2.0);
        // Requested target sits left of the zoomed origin; it gets pulled
        // up to it.
        cam.cursor_camera_transform(
            Vec2T::new(1.0, 0.0),
            Vec2T::splat(2.0),
            Vec2T::new(10.0, 0.0),
        );
        assert!(close(cam.target.x, 5.0));
        // A target already past the origin keeps its distance.
        cam.cursor_camera_transform(
            Vec2T::new(9.0, 0.0),
            Vec2T::splat(2.0),
            Vec2T::new(10.0, 0.0),
        );
        assert!(close(cam.target.x, 9.0));
    }

    #[test]
    fn screen_center_maps_to_camera_position() {
        let mut cam = Camera::new();
        cam.pos = Vec2T::new(12.0, -3.0);
        let screen = ScreenDimensions::new(800, 600);
        let world = cam.screen_to_world_transform(Vec2T::new(400.0, 300.0), screen);
        assert!(close(world.x, 12.0));
        assert!(close(world.y, -3.0));
    }

    #[test]
    fn screen_corner_accounts_for_zoom() {
        let mut cam = Camera::new();
        cam.scale = Vec2T::splat(2.0);
        let screen = ScreenDimensions::new(800, 600);
        let world = cam.screen_to_world_transform(Vec2T::new(800.0, 0.0), screen);
        // Right edge: +w / (factor * zoom); top edge: +h likewise.
        assert!(close(world.x, 800.0 / (SHADER_SCALE_FACTOR * 2.0)));
        assert!(close(world.y, 600.0 / (SHADER_SCALE_FACTOR * 2.0)));
    }

    #[test]
    fn double_precision_camera_compiles_and_updates() {
        let mut cam: CameraT<f64> = CameraT::new();
        cam.target = Vec2T::new(1.0f64, 1.0);
        cam.update(0.5);
        assert!(cam.pos.x > 0.0);
    }
}
