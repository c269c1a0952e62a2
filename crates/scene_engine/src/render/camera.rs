//! # Fly Camera
//!
//! Camera state driven by per-frame input. Nothing here is global: the viewer
//! owns a [`CameraState`], feeds it a [`CameraInput`] every frame and builds a
//! [`FrameState`] that the render step consumes.
//!
//! ## Conventions
//! Right-handed, Y-up. The camera looks down its local -Z axis. With yaw and
//! pitch at zero it looks towards world -Z.

use bitflags::bitflags;

use crate::config::ViewerConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

bitflags! {
    /// Keys held during a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CameraInput: u32 {
        /// Move along the view direction
        const FORWARD = 1 << 0;
        /// Move against the view direction
        const BACKWARD = 1 << 1;
        /// Strafe left
        const LEFT = 1 << 2;
        /// Strafe right
        const RIGHT = 1 << 3;
        /// Move along world up
        const UP = 1 << 4;
        /// Move along world down
        const DOWN = 1 << 5;
        /// Increase yaw
        const TURN_LEFT = 1 << 6;
        /// Decrease yaw
        const TURN_RIGHT = 1 << 7;
        /// Increase pitch
        const LOOK_UP = 1 << 8;
        /// Decrease pitch
        const LOOK_DOWN = 1 << 9;
        /// Multiply movement speed by the boost factor
        const BOOST = 1 << 10;
    }
}

/// Position and orientation of the camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    /// Position in world space
    pub position: Vec3,
    /// Rotation about world Y in radians
    pub yaw: f32,
    /// Rotation about the camera X axis in radians
    pub pitch: f32,
}

impl CameraState {
    /// Camera at `position` looking towards -Z
    pub fn new(position: Vec3) -> Self {
        Self { position, yaw: 0.0, pitch: 0.0 }
    }

    /// Camera at the configured start position
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(Vec3::from(config.camera_start))
    }

    /// Camera local +Z axis (points away from the view direction)
    pub fn back_axis(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            -self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Camera local +X axis, kept horizontal
    pub fn right_axis(&self) -> Vec3 {
        Vec3::y().cross(&self.back_axis()).normalize()
    }

    /// Advance the camera by one frame of input
    pub fn step(&mut self, input: CameraInput, delta_time: f32, config: &ViewerConfig) {
        let mut move_speed = delta_time * config.move_speed;
        let turn_speed = utils::deg_to_rad(delta_time * config.turn_speed_degrees);
        if input.contains(CameraInput::BOOST) {
            move_speed *= config.boost_factor;
        }

        if input.contains(CameraInput::TURN_LEFT) {
            self.yaw += turn_speed;
        }
        if input.contains(CameraInput::TURN_RIGHT) {
            self.yaw -= turn_speed;
        }
        if input.contains(CameraInput::LOOK_UP) {
            self.pitch += turn_speed;
        }
        if input.contains(CameraInput::LOOK_DOWN) {
            self.pitch -= turn_speed;
        }
        let limit = utils::deg_to_rad(config.pitch_limit_degrees);
        self.pitch = self.pitch.clamp(-limit, limit);

        let back = self.back_axis();
        let right = self.right_axis();
        let up = Vec3::y();

        if input.contains(CameraInput::FORWARD) {
            self.position -= back * move_speed;
        }
        if input.contains(CameraInput::BACKWARD) {
            self.position += back * move_speed;
        }
        if input.contains(CameraInput::LEFT) {
            self.position -= right * move_speed;
        }
        if input.contains(CameraInput::RIGHT) {
            self.position += right * move_speed;
        }
        if input.contains(CameraInput::UP) {
            self.position += up * move_speed;
        }
        if input.contains(CameraInput::DOWN) {
            self.position -= up * move_speed;
        }
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position - self.back_axis(), Vec3::y())
    }
}

/// Everything the render step needs about the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// World-to-view transform
    pub view: Mat4,
    /// View-to-clip transform
    pub projection: Mat4,
    /// Framebuffer size in pixels
    pub viewport: (u32, u32),
    /// Clear color
    pub clear_color: [f32; 4],
}

impl FrameState {
    /// Build the frame state for a camera and framebuffer size
    pub fn new(camera: &CameraState, viewport: (u32, u32), config: &ViewerConfig) -> Self {
        let (width, height) = viewport;
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        Self {
            view: camera.view_matrix(),
            projection: Mat4::perspective(
                utils::deg_to_rad(config.fov_degrees),
                aspect,
                config.near,
                config.far,
            ),
            viewport,
            clear_color: config.clear_color,
        }
    }
}
