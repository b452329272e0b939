use std::f32::consts::TAU;

use bevy_ecs::prelude::*;

use crate::components::{MaterialRole, SceneMesh, Transform};
use crate::config;
use crate::math::{Mat4f, Vec3f};
use crate::model::{upload_primitive, MeshData, RoomModel, Vertex};

/// The aiming helpers of the immersive session: targeting reticle,
/// teleportation ring and rotation cone. Spawned hidden; the session
/// bootstrap re-styles them to match the installation's wireframe look.
#[derive(Component)]
pub struct TeleportVisual;

impl TeleportVisual {
    /// Build the helper geometry and add it to the mesh store under the
    /// fixed helper names.
    pub fn register_meshes(model: &mut RoomModel, device: &wgpu::Device) {
        let (vertices, indices) = ring(0.25, 0.4, 32);
        model.register(helper_mesh(
            device,
            config::TELEPORT_TARGET_MESH_NAME,
            vertices,
            indices,
        ));

        let (vertices, indices) = torus(0.35, 0.05, 24, 12);
        model.register(helper_mesh(
            device,
            config::TELEPORT_TORUS_MESH_NAME,
            vertices,
            indices,
        ));

        let (vertices, indices) = cone(0.1, 0.3, 16);
        model.register(helper_mesh(
            device,
            config::TELEPORT_CONE_MESH_NAME,
            vertices,
            indices,
        ));
    }

    pub fn spawn(mut commands: Commands) {
        for name in [
            config::TELEPORT_TARGET_MESH_NAME,
            config::TELEPORT_TORUS_MESH_NAME,
            config::TELEPORT_CONE_MESH_NAME,
        ] {
            commands.spawn((
                TeleportVisual,
                SceneMesh {
                    name: name.to_string(),
                    material_name: String::new(),
                    role: MaterialRole::Plain,
                    color: [0.5, 0.5, 0.5, 1.0],
                    // Hidden until the session's aiming logic shows them
                    enabled: false,
                },
                Transform::from_position(Vec3f::zeros()),
            ));
        }
    }

    /// Session bootstrap: wireframe rendering with a white diffuse, to
    /// visually match the installation.
    pub fn restyle_wireframe(mut query: Query<&mut SceneMesh, With<TeleportVisual>>) {
        for mut mesh in query.iter_mut() {
            mesh.role = MaterialRole::WireFloor;
            mesh.color = [1.0, 1.0, 1.0, 1.0];
        }
    }
}

fn helper_mesh(
    device: &wgpu::Device,
    name: &str,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
) -> MeshData {
    MeshData {
        name: name.to_string(),
        material_name: String::new(),
        base_color: [0.5, 0.5, 0.5, 1.0],
        model_matrix: Mat4f::identity(),
        primitives: vec![upload_primitive(device, name, &vertices, &indices)],
    }
}

fn vertex(position: [f32; 3], tex_coords: [f32; 2]) -> Vertex {
    Vertex {
        position,
        tex_coords,
    }
}

/// Flat annulus in the XZ plane, facing up.
fn ring(inner: f32, outer: f32, segments: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = vec![];
    let mut indices = vec![];
    for i in 0..segments {
        let a = i as f32 / segments as f32 * TAU;
        let (sin, cos) = a.sin_cos();
        let u = i as f32 / segments as f32;
        vertices.push(vertex([inner * cos, 0.0, inner * sin], [u, 0.0]));
        vertices.push(vertex([outer * cos, 0.0, outer * sin], [u, 1.0]));
    }
    for i in 0..segments {
        let base = i * 2;
        let next = (i + 1) % segments * 2;
        indices.extend_from_slice(&[base, next, base + 1, base + 1, next, next + 1]);
    }
    (vertices, indices)
}

fn torus(major: f32, minor: f32, major_segments: u32, minor_segments: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = vec![];
    let mut indices = vec![];
    for i in 0..major_segments {
        let theta = i as f32 / major_segments as f32 * TAU;
        let (sin_t, cos_t) = theta.sin_cos();
        for j in 0..minor_segments {
            let phi = j as f32 / minor_segments as f32 * TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let r = major + minor * cos_p;
            vertices.push(vertex(
                [r * cos_t, minor * sin_p, r * sin_t],
                [
                    i as f32 / major_segments as f32,
                    j as f32 / minor_segments as f32,
                ],
            ));
        }
    }
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let a = i * minor_segments + j;
            let b = (i + 1) % major_segments * minor_segments + j;
            let c = i * minor_segments + (j + 1) % minor_segments;
            let d = (i + 1) % major_segments * minor_segments + (j + 1) % minor_segments;
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }
    (vertices, indices)
}

/// Upright cone with its apex on top and an open base.
fn cone(radius: f32, height: f32, segments: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = vec![vertex([0.0, height, 0.0], [0.5, 0.0])];
    let mut indices = vec![];
    for i in 0..segments {
        let a = i as f32 / segments as f32 * TAU;
        let (sin, cos) = a.sin_cos();
        vertices.push(vertex(
            [radius * cos, 0.0, radius * sin],
            [i as f32 / segments as f32, 1.0],
        ));
    }
    for i in 0..segments {
        let base = 1 + i;
        let next = 1 + (i + 1) % segments;
        indices.extend_from_slice(&[0, base, next]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restyle_turns_helpers_white_and_wireframe() {
        let mut world = World::default();
        world.spawn((
            TeleportVisual,
            SceneMesh {
                name: config::TELEPORT_TORUS_MESH_NAME.to_string(),
                material_name: String::new(),
                role: MaterialRole::Plain,
                color: [0.5, 0.5, 0.5, 1.0],
                enabled: false,
            },
        ));
        // Room meshes must be left alone
        world.spawn(SceneMesh {
            name: "room.01".to_string(),
            material_name: config::ROOM_MATERIAL_NAME.to_string(),
            role: MaterialRole::Video,
            color: [1.0, 1.0, 1.0, 1.0],
            enabled: true,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(TeleportVisual::restyle_wireframe);
        schedule.run(&mut world);

        let mut helpers = world.query_filtered::<&SceneMesh, With<TeleportVisual>>();
        for mesh in helpers.iter(&world) {
            assert_eq!(mesh.role, MaterialRole::WireFloor);
            assert_eq!(mesh.color, [1.0, 1.0, 1.0, 1.0]);
        }
        let mut rooms = world.query_filtered::<&SceneMesh, Without<TeleportVisual>>();
        for mesh in rooms.iter(&world) {
            assert_eq!(mesh.role, MaterialRole::Video);
        }
    }

    #[test]
    fn helper_geometry_is_closed_triangle_lists() {
        let (vertices, indices) = ring(0.25, 0.4, 8);
        assert_eq!(vertices.len(), 16);
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|i| (*i as usize) < vertices.len()));

        let (vertices, indices) = torus(0.35, 0.05, 6, 4);
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|i| (*i as usize) < vertices.len()));

        let (vertices, indices) = cone(0.1, 0.3, 5);
        assert_eq!(vertices.len(), 6);
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|i| (*i as usize) < vertices.len()));
    }
}
