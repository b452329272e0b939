#![allow(dead_code)]

use crate::math::{Mat4f, UnitQuat, UnitQuatf, Vec3, Vec3f};
use bevy_ecs::prelude::*;

#[derive(Component, Debug)]
pub struct Transform {
    // Individual components
    pos: Vec3f,
    rot: UnitQuatf,
    scale: Vec3f,
    // Cached transform matrix
    m: Mat4f,
}

impl Transform {
    pub fn new(pos: Vec3f, rot: UnitQuatf, scale: Vec3f) -> Self {
        let m = Mat4f::identity();
        let mut res = Self { pos, rot, scale, m };
        res.rebuild_matrix();
        res
    }

    pub fn from_position(pos: Vec3f) -> Self {
        Transform::new(pos, UnitQuat::identity(), Vec3::from_element(1.0))
    }

    /// Adopt a world matrix as-is (imported scene nodes carry these).
    pub fn from_matrix(m: Mat4f) -> Self {
        let pos = m.column(3).xyz();
        Self {
            pos,
            rot: UnitQuat::identity(),
            scale: Vec3::from_element(1.0),
            m,
        }
    }

    pub fn matrix(&self) -> Mat4f {
        self.m
    }

    pub fn position(&self) -> Vec3f {
        self.pos
    }

    pub fn rotation(&self) -> UnitQuatf {
        self.rot
    }

    pub fn set_position(&mut self, pos: Vec3f) {
        self.pos = pos;
        self.rebuild_matrix();
    }

    pub fn set_pose(&mut self, pos: Vec3f, rot: UnitQuatf) {
        self.pos = pos;
        self.rot = rot;
        self.rebuild_matrix();
    }

    fn rebuild_matrix(&mut self) {
        let translation = Mat4f::new_translation(&self.pos);
        let rotation = self.rot.to_homogeneous();
        let scale = Mat4f::new_nonuniform_scaling(&self.scale);
        self.m = translation * rotation * scale;
    }
}
