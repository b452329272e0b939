use bevy_ecs::prelude::*;

use crate::assets::Assets;
use crate::components::Transform;
use crate::config;

/// How a mesh is drawn. Assigned from the authored material name at load;
/// the teleport visuals are re-styled to WireFloor on session init.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialRole {
    /// Diffuse and emissive sample the looping video, both faces drawn.
    Video,
    /// Line-list wireframe.
    WireFloor,
    /// Flat base color.
    Plain,
}

/// Drawable mesh instance. `name` looks the geometry up in the asset store.
#[derive(Component, Debug)]
pub struct SceneMesh {
    pub name: String,
    pub material_name: String,
    pub role: MaterialRole,
    pub color: [f32; 4],
    pub enabled: bool,
}

/// Marker for meshes that came from the room model; the visibility cycler
/// only ever touches these.
#[derive(Component)]
pub struct RoomMesh;

impl SceneMesh {
    pub fn role_for_material(material_name: &str) -> MaterialRole {
        if material_name == config::ROOM_MATERIAL_NAME {
            MaterialRole::Video
        } else if material_name == config::FLOOR_MATERIAL_NAME {
            MaterialRole::WireFloor
        } else {
            MaterialRole::Plain
        }
    }

    /// Only the root, the default room variant and the ground stay visible
    /// after load; the cycler takes it from there.
    pub fn enabled_by_default(mesh_name: &str) -> bool {
        mesh_name == config::ROOT_MESH_NAME
            || mesh_name == config::DEFAULT_ROOM_MESH_NAME
            || mesh_name == config::GROUND_MESH_NAME
    }

    pub fn spawn_room(mut commands: Commands, assets: Res<Assets>) {
        for name in &assets.room_model.load_order {
            let data = &assets.room_model.meshes[name];
            let role = Self::role_for_material(&data.material_name);
            let color = match role {
                // The video already carries the light; tinting would darken it
                MaterialRole::Video => [1.0, 1.0, 1.0, 1.0],
                _ => data.base_color,
            };
            commands.spawn((
                RoomMesh,
                SceneMesh {
                    name: data.name.clone(),
                    material_name: data.material_name.clone(),
                    role,
                    color,
                    enabled: Self::enabled_by_default(&data.name),
                },
                Transform::from_matrix(data.model_matrix),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_material_maps_to_video_role() {
        assert_eq!(
            SceneMesh::role_for_material(config::ROOM_MATERIAL_NAME),
            MaterialRole::Video
        );
    }

    #[test]
    fn floor_material_maps_to_wireframe_role() {
        assert_eq!(
            SceneMesh::role_for_material(config::FLOOR_MATERIAL_NAME),
            MaterialRole::WireFloor
        );
    }

    #[test]
    fn other_materials_stay_plain() {
        assert_eq!(
            SceneMesh::role_for_material("walls.004"),
            MaterialRole::Plain
        );
    }

    #[test]
    fn only_anchors_are_enabled_by_default() {
        assert!(SceneMesh::enabled_by_default("__root__"));
        assert!(SceneMesh::enabled_by_default("room.01"));
        assert!(SceneMesh::enabled_by_default("ground.01"));
        assert!(!SceneMesh::enabled_by_default("room.02"));
        assert!(!SceneMesh::enabled_by_default("room.03"));
        assert!(!SceneMesh::enabled_by_default("room.04"));
        assert!(!SceneMesh::enabled_by_default("pillar.01"));
    }
}
