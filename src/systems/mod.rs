mod render;
mod room_cycle;
mod schedules;

use crate::app::{AppState, SceneSettings};
use crate::device::Device;
use crate::events::{FrameTimeEvent, KeyboardEvent, MouseEvent, WindowResizeEvent};
use crate::frame_time::FrameTime;
use crate::input::Input;
use bevy_ecs::prelude::*;
use winit::event::{MouseButton, VirtualKeyCode};

pub use render::{prepare_render_pipelines, render, render_to_texture};
#[cfg(target_arch = "wasm32")]
pub use render::refresh_video_texture;
pub use room_cycle::{advance_room_cycle, apply_room_cycle, RoomCycle};
pub use schedules::{
    new_camera_update_schedule, new_preupdate_schedule, new_render_schedule,
    new_spawn_scene_schedule, new_update_schedule, new_xr_init_schedule, CameraUpdateLabel,
    PreupdateLabel, RenderLabel, SpawnLabel, UpdateLabel, XrInitLabel,
};

pub fn resize_device(mut device: ResMut<Device>, mut events: EventReader<WindowResizeEvent>) {
    if let Some(e) = events.iter().last() {
        device.resize(e.new_size)
    }
}

pub fn escape_on_exit(mut app: ResMut<AppState>, mut keyboard_events: EventReader<KeyboardEvent>) {
    if keyboard_events
        .iter()
        .any(|e| e.code == VirtualKeyCode::Escape && e.pressed)
    {
        app.running = false;
    }
}

pub fn update_frame_time(mut frame_time: ResMut<FrameTime>, mut events: EventReader<FrameTimeEvent>) {
    if let Some(e) = events.iter().last() {
        frame_time.set_manual_delta(e.duration);
    }
    frame_time.update();
}

pub fn update_input_state(
    mut input: ResMut<Input>,
    mut keyboard_events: EventReader<KeyboardEvent>,
    mut mouse_events: EventReader<MouseEvent>,
) {
    input.reset();
    for e in keyboard_events.iter() {
        input.set_key(e.code, e.pressed);
    }
    for e in mouse_events.iter() {
        match e {
            MouseEvent::Move(dx, dy) => input.add_mouse_delta(*dx, *dy),
            MouseEvent::Button {
                button: MouseButton::Left,
                pressed,
            } => input.mouse_pressed = *pressed,
            _ => {}
        }
    }
}

/// Session bootstrap: nothing is drawn where the room is not, so the
/// passthrough surroundings show through.
pub fn set_transparent_clear(mut settings: ResMut<SceneSettings>) {
    settings.clear_color = wgpu::Color::TRANSPARENT;
}
