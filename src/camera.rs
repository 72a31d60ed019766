//! Free-fly camera.
//!
//! Orientation is a yaw about +Y followed by a pitch about +X, both in
//! degrees. The basis vectors are the rotated `+Z` (view), `+Y` (up) and
//! `up × view` (right). Movement is applied per frame, not per second.

use glam::{Mat3, Mat4, Vec3};
use serde::Deserialize;

/// Starting pose and tuning for [`CameraState`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    /// Degrees about +Y.
    pub yaw: f32,
    /// Degrees about +X, clamped to `±max_pitch`.
    pub pitch: f32,
    pub max_pitch: f32,
    /// Degrees of rotation per unit of mouse motion.
    pub sensitivity: f32,
    /// Distance moved per frame without boost.
    pub base_speed: f32,
    /// Speed added each frame while boost is held.
    pub boost_step: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, -4.0),
            yaw: 0.0,
            pitch: 0.0,
            max_pitch: 89.0,
            sensitivity: 0.2,
            base_speed: 0.1,
            boost_step: 0.01,
            fov_y: 90.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

/// Requested movement for one frame. Axis values are `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement {
    /// Along the view direction.
    pub forward: f32,
    /// Along the right vector.
    pub strafe: f32,
    /// Along the up vector.
    pub lift: f32,
    pub boost: bool,
}

#[derive(Debug, Clone)]
pub struct CameraState {
    pub eye: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    config: CameraConfig,
}

impl CameraState {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            eye: config.eye,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-config.max_pitch, config.max_pitch),
            speed: config.base_speed,
            config,
        }
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current per-frame movement distance.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Apply a relative cursor motion in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let s = self.config.sensitivity;
        let max = self.config.max_pitch;
        self.yaw -= s * dx;
        self.pitch = (self.pitch + s * dy).clamp(-max, max);
    }

    /// Advance the eye by one frame of movement.
    ///
    /// Holding boost accelerates by `boost_step` per frame; releasing it
    /// drops back to `base_speed`.
    pub fn advance(&mut self, movement: Movement) {
        if movement.boost {
            self.speed += self.config.boost_step;
        } else {
            self.speed = self.config.base_speed;
        }

        let offset = self.view_dir() * movement.forward
            + self.right_dir() * movement.strafe
            + self.up_dir() * movement.lift;
        self.eye += offset * self.speed;
    }

    fn rotation(&self) -> Mat3 {
        let yaw = Mat3::from_rotation_y(self.yaw.to_radians());
        yaw * Mat3::from_rotation_x(self.pitch.to_radians())
    }

    pub fn view_dir(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    pub fn up_dir(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    pub fn right_dir(&self) -> Vec3 {
        self.up_dir().cross(self.view_dir())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.view_dir(), self.up_dir())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let c = &self.config;
        Mat4::perspective_rh(c.fov_y.to_radians(), aspect, c.near, c.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_initial_basis() {
        let cam = CameraState::default();
        assert!(close(cam.view_dir(), Vec3::Z));
        assert!(close(cam.up_dir(), Vec3::Y));
        assert!(close(cam.right_dir(), Vec3::X));
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, -4.0));
    }

    #[test]
    fn test_pitch_clamped() {
        let mut cam = CameraState::default();
        cam.look(0.0, 10_000.0);
        assert_eq!(cam.pitch(), 89.0);
        cam.look(0.0, -20_000.0);
        assert_eq!(cam.pitch(), -89.0);
    }

    #[test]
    fn test_look_signs() {
        let mut cam = CameraState::default();
        cam.look(10.0, 5.0);
        assert_eq!(cam.yaw(), -2.0);
        assert_eq!(cam.pitch(), 1.0);
        // Positive pitch tips the view downward.
        assert!(cam.view_dir().y < 0.0);
    }

    #[test]
    fn test_forward_moves_along_view() {
        let mut cam = CameraState::default();
        cam.advance(Movement {
            forward: 1.0,
            ..Movement::default()
        });
        assert!(close(cam.eye, Vec3::new(0.0, 3.0, -3.9)));
    }

    #[test]
    fn test_boost_accelerates_then_resets() {
        let mut cam = CameraState::default();
        let boost = Movement {
            boost: true,
            ..Movement::default()
        };
        cam.advance(boost);
        cam.advance(boost);
        assert!((cam.speed() - 0.12).abs() < 1e-6);

        cam.advance(Movement::default());
        assert_eq!(cam.speed(), 0.1);
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let mut cam = CameraState::default();
        cam.look(37.0, -12.0);
        let p = cam.view_matrix().transform_point3(cam.eye);
        assert!(close(p, Vec3::ZERO));

        // A point ahead of the camera lands on -Z in view space.
        let ahead = cam.view_matrix().transform_point3(cam.eye + cam.view_dir() * 5.0);
        assert!(close(ahead, Vec3::new(0.0, 0.0, -5.0)));
    }
}
