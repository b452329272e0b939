use crate::device::SurfaceSize;
use crate::math::{Mat4f, UnitQuatf, Vec3f};
use bevy_ecs::prelude::*;
use winit::event::{MouseButton, VirtualKeyCode};

#[derive(Event)]
pub struct WindowResizeEvent {
    pub new_size: SurfaceSize,
}

#[derive(Event)]
pub struct KeyboardEvent {
    pub code: VirtualKeyCode,
    pub pressed: bool,
}

#[derive(Event)]
pub enum MouseEvent {
    Move(f32, f32),
    Button { button: MouseButton, pressed: bool },
}

#[derive(Event)]
pub struct FrameTimeEvent {
    pub duration: std::time::Duration,
}

#[derive(Event)]
pub struct CameraSetEvent {
    pub pos: Vec3f,
    pub rot: UnitQuatf,
    pub projection_matrix: Mat4f,
}

/// Fired by the cycle timer each time the active room variant advances.
#[derive(Event)]
pub struct RoomCycleEvent {
    pub active_mesh: String,
}
