use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ScheduleLabel;

use crate::components::{Player, SceneMesh, TeleportVisual};
use crate::events::{
    CameraSetEvent, FrameTimeEvent, KeyboardEvent, MouseEvent, RoomCycleEvent, WindowResizeEvent,
};
use crate::systems::{
    advance_room_cycle, apply_room_cycle, escape_on_exit, prepare_render_pipelines, render,
    resize_device, set_transparent_clear, update_frame_time, update_input_state,
};

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpawnLabel;

pub fn new_spawn_scene_schedule(webxr: bool) -> (Schedule, SpawnLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems(prepare_render_pipelines.run_if(run_once()))
        .add_systems(SceneMesh::spawn_room.run_if(run_once()))
        .add_systems(Player::spawn.run_if(run_once()));

    if webxr {
        schedule.add_systems(TeleportVisual::spawn.run_if(run_once()));
    }
    (schedule, SpawnLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PreupdateLabel;

pub fn new_preupdate_schedule() -> (Schedule, PreupdateLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems((
            Events::<WindowResizeEvent>::update_system,
            Events::<KeyboardEvent>::update_system,
            Events::<MouseEvent>::update_system,
            Events::<FrameTimeEvent>::update_system,
            Events::<CameraSetEvent>::update_system,
            Events::<RoomCycleEvent>::update_system,
        ))
        .add_systems((
            escape_on_exit,
            resize_device,
            Player::resize_projection,
            update_input_state,
            update_frame_time,
        ));
    (schedule, PreupdateLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UpdateLabel;

pub fn new_update_schedule() -> (Schedule, UpdateLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(Player::update);
    schedule.add_systems((advance_room_cycle, apply_room_cycle).chain());
    #[cfg(target_arch = "wasm32")]
    schedule.add_systems(crate::systems::refresh_video_texture);
    (schedule, UpdateLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CameraUpdateLabel;

pub fn new_camera_update_schedule() -> (Schedule, CameraUpdateLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(Player::update_view_xr);
    (schedule, CameraUpdateLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct XrInitLabel;

/// Runs exactly once per immersive session, right after the session is
/// established.
pub fn new_xr_init_schedule() -> (Schedule, XrInitLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems((TeleportVisual::restyle_wireframe, set_transparent_clear));
    (schedule, XrInitLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderLabel;

pub fn new_render_schedule() -> (Schedule, RenderLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(render);
    (schedule, RenderLabel)
}
