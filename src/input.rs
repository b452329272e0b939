use bevy_ecs::prelude::Resource;
use winit::event::VirtualKeyCode;

/// Keyboard/mouse state fed by the window event handler and consumed by the
/// free-roam player. Mouse deltas are per-frame and cleared by reset().
#[derive(Resource)]
pub struct Input {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub mouse_pressed: bool,
    pub mouse_delta: (f32, f32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            up: false,
            down: false,
            mouse_pressed: false,
            mouse_delta: (0.0, 0.0),
        }
    }

    pub fn reset(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }

    pub fn set_key(&mut self, code: VirtualKeyCode, pressed: bool) {
        match code {
            VirtualKeyCode::W | VirtualKeyCode::Up => self.forward = pressed,
            VirtualKeyCode::S | VirtualKeyCode::Down => self.backward = pressed,
            VirtualKeyCode::A | VirtualKeyCode::Left => self.left = pressed,
            VirtualKeyCode::D | VirtualKeyCode::Right => self.right = pressed,
            VirtualKeyCode::Space => self.up = pressed,
            VirtualKeyCode::LShift => self.down = pressed,
            _ => {}
        }
    }

    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }
}
