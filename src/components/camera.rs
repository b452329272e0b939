use bevy_ecs::prelude::*;
use nalgebra::Perspective3;
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use crate::input::Input;
use crate::math::{Mat4, Mat4f, Point3f, UnitQuatf, Vec3, Vec3f};

#[rustfmt::skip]
pub const FLIPY_MATRIX: Mat4f = Mat4::new(
    1.0,  0.0, 0.0, 0.0,
    0.0, -1.0, 0.0, 0.0,
    0.0,  0.0, 1.0, 0.0,
    0.0,  0.0, 0.0, 1.0,
);

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

/// Free-roam camera plus the XR view it is overridden by while an immersive
/// session is presenting.
#[derive(Component, Debug)]
pub struct Camera {
    pub position: Point3f,
    yaw: f32,
    pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub projection: Projection,
    pub xr_camera: XrCamera,
}

impl Camera {
    pub fn new<P: Into<Point3f>>(position: P, speed: f32, projection: Projection) -> Self {
        Self {
            position: position.into(),
            yaw: 0.0,
            pitch: 0.0,
            speed,
            sensitivity: 0.4,
            projection,
            xr_camera: XrCamera {
                position: [0.0, 0.0, 0.0].into(),
                rotation: UnitQuatf::identity(),
                projection: Mat4f::identity(),
            },
        }
    }

    /// Point the view at a world position.
    pub fn aim_at(&mut self, target: Point3f) {
        let dir = target - self.position;
        if dir.norm() == 0.0 {
            return;
        }
        self.yaw = dir.x.atan2(dir.z);
        self.pitch = (dir.y / dir.norm()).asin();
    }

    /// Walk/look update for the desktop branch. Speed is per frame at the
    /// 60 fps rate the installation was tuned on, so it is rescaled by the
    /// real frame delta.
    pub fn update_from_input(&mut self, input: &Input, dt: Duration) {
        let dt = dt.as_secs_f32();
        let step = self.speed * dt * 60.0;

        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let forward = Vec3f::new(yaw_sin, 0.0, yaw_cos);
        let right = Vec3f::new(yaw_cos, 0.0, -yaw_sin);

        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        self.position += forward * axis(input.forward, input.backward) * step;
        self.position += right * axis(input.right, input.left) * step;
        self.position.y += axis(input.up, input.down) * step;

        if input.mouse_pressed {
            self.yaw += input.mouse_delta.0 * self.sensitivity * dt;
            self.pitch -= input.mouse_delta.1 * self.sensitivity * dt;
            self.pitch = self.pitch.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: self.position.to_homogeneous().into(),
            view_proj: self.view_proj().into(),
        }
    }

    pub fn view_proj(&self) -> Mat4f {
        self.projection.matrix() * self.calc_matrix()
    }

    fn calc_matrix(&self) -> Mat4f {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let dir = Vec3f::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw).normalize();
        Mat4f::look_at_lh(&self.position, &(self.position + dir), &Vec3::y_axis())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }
}

/// View pose reported by the XR frame callback.
#[derive(Debug)]
pub struct XrCamera {
    pub position: Point3f,
    pub rotation: UnitQuatf,
    pub projection: Mat4f,
}

impl XrCamera {
    pub fn to_uniform(&self) -> CameraUniform {
        let pos = self.position * -1.0;
        CameraUniform {
            view_position: pos.to_homogeneous().into(),
            view_proj: self.view_proj().into(),
        }
    }

    pub fn view_proj(&self) -> Mat4f {
        // The WebXR framebuffer has a flipped Y coordinate relative to wgpu
        // clip space, so:
        // 1. Pre-multiply the projection by FLIPY_MATRIX to invert clip-space Y.
        // 2. Invert the triangle winding order to CW (see the render pipelines).
        // 3. Conjugate the rotation and negate the position for the same flip.
        let pos = self.position * -1.0;
        let rot = self.rotation.conjugate();
        let pos = Vec3f::new(pos.x, pos.y, pos.z);
        let view = Mat4f::from(rot.to_rotation_matrix()) * Mat4f::new_translation(&pos);
        FLIPY_MATRIX * self.projection * view
    }
}

#[derive(Debug)]
pub struct Projection {
    perspective: Perspective3<f32>,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            perspective: Perspective3::new(width as f32 / height as f32, fovy, znear, zfar),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.perspective.set_aspect(width as f32 / height as f32);
    }

    pub fn matrix(&self) -> Mat4f {
        *self.perspective.as_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn test_camera() -> Camera {
        let projection = Projection::new(1900, 1200, 45f32.to_radians(), 0.1, 100.0);
        Camera::new([0.0, 1.4, 0.0], 0.1, projection)
    }

    #[test]
    fn aim_at_point_ahead_faces_negative_z() {
        let mut camera = test_camera();
        camera.aim_at(Point3f::new(0.0, 1.4, -5.0));
        assert!((camera.yaw().abs() - PI).abs() < 1e-5);
        assert!(camera.pitch().abs() < 1e-5);
    }

    #[test]
    fn forward_input_walks_toward_view_direction() {
        let mut camera = test_camera();
        camera.aim_at(Point3f::new(0.0, 1.4, -5.0));
        let mut input = Input::new();
        input.forward = true;
        camera.update_from_input(&input, Duration::from_secs_f32(1.0 / 60.0));
        assert!(camera.position.z < 0.0);
        assert!((camera.position.y - 1.4).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped_to_straight_up_and_down() {
        let mut camera = test_camera();
        let mut input = Input::new();
        input.mouse_pressed = true;
        input.mouse_delta = (0.0, -1e6);
        camera.update_from_input(&input, Duration::from_secs_f32(1.0 / 60.0));
        assert!(camera.pitch() <= SAFE_FRAC_PI_2);
    }
}
