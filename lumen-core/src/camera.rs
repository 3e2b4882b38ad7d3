//! Free-fly camera driven by Euler angles.
//!
//! The [`Camera`] stores a yaw and a pitch in degrees and derives an orthonormal
//! front/right/up basis from them. The basis is only ever recomputed from the angles, so it
//! stays consistent no matter how the camera is moved.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_FOV: f32 = 45.0;

/// Pitch limit in degrees. Keeps `front` away from the world-up axis.
pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 45.0;

/// Directions the camera can be moved in with the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Initial camera state, as read from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub world_up: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub flying: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            world_up: [0.0, 1.0, 0.0],
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            fov: DEFAULT_FOV,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            flying: true,
        }
    }
}

/// An Euler-angle first-person camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,

    fov: f32,
    speed: f32,
    sensitivity: f32,
    flying: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl Camera {
    /// Creates a camera at `position` looking along the direction given by `yaw` and `pitch`.
    pub fn new(position: Vec3, up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up,
            right: Vec3::X,
            world_up: up,
            yaw,
            pitch,
            fov: DEFAULT_FOV,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            flying: true,
        };
        camera.update_camera_vectors();
        camera
    }

    /// Creates a camera from a [`CameraConfig`]. Out-of-range values are clamped.
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(
            Vec3::from(config.position),
            Vec3::from(config.world_up),
            config.yaw,
            config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        );
        camera.fov = config.fov.clamp(MIN_FOV, MAX_FOV);
        camera.speed = config.speed;
        camera.sensitivity = config.sensitivity;
        camera.flying = config.flying;
        camera
    }

    /// Returns the right-handed look-at matrix for the current state.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Returns an OpenGL perspective projection using the current field of view.
    pub fn projection_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect_ratio, near, far)
    }

    /// Field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_flying(&self) -> bool {
        self.flying
    }

    /// When flying is disabled, keyboard movement is restricted to the horizontal plane.
    pub fn set_flying(&mut self, flying: bool) {
        self.flying = flying;
    }

    /// Moves the camera in `direction` for `dt` seconds.
    pub fn handle_keyboard(&mut self, direction: Movement, dt: f32) {
        let velocity = self.speed * dt;
        let mut delta = match direction {
            Movement::Forward => self.front * velocity,
            Movement::Backward => -self.front * velocity,
            Movement::Left => -self.right * velocity,
            Movement::Right => self.right * velocity,
        };

        if !self.flying {
            let up = self.world_up.normalize_or_zero();
            delta -= up * delta.dot(up);
        }

        self.position += delta;
    }

    /// Rotates the camera by a mouse offset in screen units.
    ///
    /// `yoffset` is expected to grow upwards. With `constrain_pitch` the pitch stays within
    /// [`PITCH_LIMIT`].
    pub fn handle_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.sensitivity;
        self.pitch += yoffset * self.sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_camera_vectors();
    }

    /// Zooms by narrowing or widening the field of view.
    pub fn handle_mouse_scroll(&mut self, yoffset: f32) {
        self.fov = (self.fov - yoffset).clamp(MIN_FOV, MAX_FOV);
    }

    fn update_camera_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
