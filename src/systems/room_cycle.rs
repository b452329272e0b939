use bevy_ecs::prelude::*;

use crate::components::{RoomMesh, SceneMesh};
use crate::config;
use crate::events::RoomCycleEvent;
use crate::frame_time::FrameTime;

/// Frame-driven variant timer. Real-world period depends on the render
/// loop's frame rate, not wall-clock time.
#[derive(Resource)]
pub struct RoomCycle {
    pub index: usize,
    pub elapsed_ms: f32,
}

impl RoomCycle {
    pub fn new() -> Self {
        Self {
            index: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn active_mesh_name(&self) -> String {
        config::room_variant_name(self.index)
    }
}

impl Default for RoomCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulate the frame delta; on crossing the period, reset to zero,
/// advance the index modulo the variant count and announce the new active
/// mesh. Fires at most once per frame.
pub fn advance_room_cycle(
    mut cycle: ResMut<RoomCycle>,
    frame_time: Res<FrameTime>,
    mut events: EventWriter<RoomCycleEvent>,
) {
    cycle.elapsed_ms += frame_time.delta.as_secs_f32() * 1000.0;
    if cycle.elapsed_ms > config::CYCLE_PERIOD_MS {
        cycle.elapsed_ms = 0.0;
        cycle.index = (cycle.index + 1) % config::ROOM_VARIANT_COUNT;
        let active_mesh = cycle.active_mesh_name();
        log::info!("{}", active_mesh);
        events.send(RoomCycleEvent { active_mesh });
    }
}

/// Enforce the single-active-variant rule over the loaded room meshes:
/// only the root, the active variant and the ground stay enabled.
pub fn apply_room_cycle(
    mut events: EventReader<RoomCycleEvent>,
    mut meshes: Query<&mut SceneMesh, With<RoomMesh>>,
) {
    let Some(event) = events.iter().last() else {
        return;
    };
    for mut mesh in meshes.iter_mut() {
        mesh.enabled = mesh.name == config::ROOT_MESH_NAME
            || mesh.name == event.active_mesh
            || mesh.name == config::GROUND_MESH_NAME;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MaterialRole;
    use std::time::Duration;

    fn spawn_mesh(world: &mut World, name: &str, enabled: bool) {
        world.spawn((
            RoomMesh,
            SceneMesh {
                name: name.to_string(),
                material_name: String::new(),
                role: MaterialRole::Plain,
                color: [1.0, 1.0, 1.0, 1.0],
                enabled,
            },
        ));
    }

    fn test_world() -> (World, Schedule) {
        let mut world = World::default();
        world.insert_resource(RoomCycle::new());
        world.insert_resource(FrameTime::new(true));
        world.init_resource::<Events<RoomCycleEvent>>();

        spawn_mesh(&mut world, "__root__", true);
        spawn_mesh(&mut world, "ground.01", true);
        for (i, name) in ["room.01", "room.02", "room.03", "room.04"]
            .iter()
            .enumerate()
        {
            spawn_mesh(&mut world, name, i == 0);
        }

        let mut schedule = Schedule::default();
        schedule.add_systems((advance_room_cycle, apply_room_cycle).chain());
        (world, schedule)
    }

    fn step(world: &mut World, schedule: &mut Schedule, millis: f32) {
        world
            .resource_mut::<FrameTime>()
            .set_manual_delta(Duration::from_secs_f32(millis / 1000.0));
        schedule.run(world);
    }

    fn enabled_names(world: &mut World) -> Vec<String> {
        let mut query = world.query::<&SceneMesh>();
        let mut names: Vec<String> = query
            .iter(world)
            .filter(|m| m.enabled)
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    }

    fn enabled_room_variant(world: &mut World) -> String {
        let names = enabled_names(world);
        let variants: Vec<&String> = names.iter().filter(|n| n.starts_with("room.")).collect();
        assert_eq!(variants.len(), 1, "exactly one variant enabled: {:?}", names);
        variants[0].clone()
    }

    #[test]
    fn nothing_fires_below_the_period() {
        let (mut world, mut schedule) = test_world();
        step(&mut world, &mut schedule, config::CYCLE_PERIOD_MS - 1.0);
        assert_eq!(world.resource::<RoomCycle>().index, 0);
        assert_eq!(enabled_room_variant(&mut world), "room.01");
    }

    #[test]
    fn six_firings_cycle_through_the_variants() {
        let (mut world, mut schedule) = test_world();
        let mut seen = vec![];
        for _ in 0..6 {
            step(&mut world, &mut schedule, config::CYCLE_PERIOD_MS + 1.0);
            seen.push(enabled_room_variant(&mut world));
        }
        assert_eq!(
            seen,
            vec!["room.02", "room.03", "room.04", "room.01", "room.02", "room.03"]
        );
    }

    #[test]
    fn anchors_stay_enabled_after_every_firing() {
        let (mut world, mut schedule) = test_world();
        for _ in 0..5 {
            step(&mut world, &mut schedule, config::CYCLE_PERIOD_MS + 1.0);
            let names = enabled_names(&mut world);
            assert!(names.contains(&"__root__".to_string()));
            assert!(names.contains(&"ground.01".to_string()));
            assert_eq!(names.len(), 3);
        }
    }

    #[test]
    fn accumulator_resets_to_zero_and_does_not_double_fire() {
        let (mut world, mut schedule) = test_world();
        // A delta far beyond the period still advances a single step
        step(&mut world, &mut schedule, config::CYCLE_PERIOD_MS * 10.0);
        {
            let cycle = world.resource::<RoomCycle>();
            assert_eq!(cycle.elapsed_ms, 0.0);
            assert_eq!(cycle.index, 1);
        }
        // The next short frame must not fire again
        step(&mut world, &mut schedule, 1.0);
        assert_eq!(world.resource::<RoomCycle>().index, 1);
        assert_eq!(enabled_room_variant(&mut world), "room.02");
    }

    #[test]
    fn index_stays_in_variant_range() {
        let (mut world, mut schedule) = test_world();
        for _ in 0..23 {
            step(&mut world, &mut schedule, config::CYCLE_PERIOD_MS + 1.0);
            let cycle = world.resource::<RoomCycle>();
            assert!(cycle.index < config::ROOM_VARIANT_COUNT);
            let name = cycle.active_mesh_name();
            assert!(["room.01", "room.02", "room.03", "room.04"].contains(&name.as_str()));
        }
    }
}
