use bevy_ecs::prelude::*;

use crate::app::AppState;
use crate::components::{Camera, Projection, XrCamera};
use crate::device::Device;
use crate::events::{CameraSetEvent, WindowResizeEvent};
use crate::frame_time::FrameTime;
use crate::input::Input;
use crate::math::Point3f;

/// The single viewer entity. Desktop mode walks it with keyboard/mouse;
/// immersive mode overrides its view per XR frame.
#[derive(Component)]
pub struct Player;

impl Player {
    pub fn spawn(mut commands: Commands, device: Res<Device>) {
        let size = device.surface_size();
        let projection =
            Projection::new(size.width, size.height, 45f32.to_radians(), 0.1, 100.0);
        // Eye height start, aimed five units into the room
        let mut camera = Camera::new([0.0, 1.4, 0.0], 0.1, projection);
        camera.aim_at(Point3f::new(0.0, 1.4, -5.0));
        commands.spawn((Player, camera));
    }

    pub fn update(
        appstate: Res<AppState>,
        input: Res<Input>,
        frame_time: Res<FrameTime>,
        mut query: Query<&mut Camera, With<Player>>,
    ) {
        if appstate.webxr {
            // The headset pose drives the view
            return;
        }
        let Ok(mut camera) = query.get_single_mut() else {
            return;
        };
        camera.update_from_input(&input, frame_time.delta);
    }

    pub fn update_view_xr(
        mut events: EventReader<CameraSetEvent>,
        mut query: Query<&mut Camera, With<Player>>,
    ) {
        let Some(event) = events.iter().last() else {
            return;
        };
        let Ok(mut camera) = query.get_single_mut() else {
            return;
        };
        camera.xr_camera = XrCamera {
            position: Point3f::from(event.pos),
            rotation: event.rot,
            projection: event.projection_matrix,
        };
    }

    pub fn resize_projection(
        mut events: EventReader<WindowResizeEvent>,
        mut query: Query<&mut Camera, With<Player>>,
    ) {
        let Some(event) = events.iter().last() else {
            return;
        };
        let Ok(mut camera) = query.get_single_mut() else {
            return;
        };
        camera.resize(event.new_size.width, event.new_size.height);
    }
}
