use std::collections::HashMap;

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::config;
use crate::logging::printlog;
use crate::math::Mat4f;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

pub struct Primitive {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    /// Triangle edges expanded to a line list, for wireframe draws.
    pub line_index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub num_line_indices: u32,
    pub num_vertices: u32,
}

pub struct MeshData {
    pub name: String,
    pub material_name: String,
    pub base_color: [f32; 4],
    pub model_matrix: Mat4f,
    pub primitives: Vec<Primitive>,
}

impl MeshData {
    pub fn total_vertices(&self) -> u32 {
        self.primitives.iter().map(|p| p.num_vertices).sum()
    }

    pub fn total_indices(&self) -> u32 {
        self.primitives.iter().map(|p| p.num_indices).sum()
    }
}

/// The imported room model plus any helper meshes registered later.
/// Meshes are looked up by name; `load_order` keeps the imported scene
/// order for spawning and logging.
pub struct RoomModel {
    pub meshes: HashMap<String, MeshData>,
    pub load_order: Vec<String>,
}

impl RoomModel {
    pub fn from_glb(device: &wgpu::Device, bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;

        let mut meshes = HashMap::new();
        let mut load_order = vec![];

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| anyhow::anyhow!("model has no scene"))?;
        for node in scene.nodes() {
            import_node(device, &buffers, &node, Mat4f::identity(), &mut meshes, &mut load_order);
        }

        for name in &load_order {
            let mesh = &meshes[name];
            printlog(&format!(
                "Mesh loaded: {}, num vertices: {} num indices: {}",
                mesh.name,
                mesh.total_vertices(),
                mesh.total_indices()
            ));
        }

        Ok(Self { meshes, load_order })
    }

    /// Names of the meshes the immersive mode treats as walkable floors.
    pub fn floor_mesh_names(&self) -> Vec<String> {
        self.load_order
            .iter()
            .filter(|name| self.meshes[*name].material_name == config::FLOOR_MATERIAL_NAME)
            .cloned()
            .collect()
    }

    pub fn register(&mut self, mesh: MeshData) {
        self.meshes.insert(mesh.name.clone(), mesh);
    }
}

fn import_node(
    device: &wgpu::Device,
    buffers: &[gltf::buffer::Data],
    node: &gltf::Node,
    parent_matrix: Mat4f,
    meshes: &mut HashMap<String, MeshData>,
    load_order: &mut Vec<String>,
) {
    let local: Mat4f = node.transform().matrix().into();
    let model_matrix = parent_matrix * local;

    if let Some(mesh) = node.mesh() {
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh.{}", mesh.index()));

        let mut material_name = String::new();
        let mut base_color = [1.0, 1.0, 1.0, 1.0];
        let mut primitives = vec![];
        for primitive in mesh.primitives() {
            let material = primitive.material();
            if let Some(n) = material.name() {
                material_name = n.to_string();
            }
            base_color = material.pbr_metallic_roughness().base_color_factor();

            let reader = primitive.reader(|b| Some(buffers[b.index()].0.as_slice()));
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(p) => p.collect(),
                None => continue,
            };
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let vertices = interleave(&positions, &tex_coords);
            primitives.push(upload_primitive(device, &name, &vertices, &indices));
        }

        meshes.insert(
            name.clone(),
            MeshData {
                name: name.clone(),
                material_name,
                base_color,
                model_matrix,
                primitives,
            },
        );
        load_order.push(name);
    }

    for child in node.children() {
        import_node(device, buffers, &child, model_matrix, meshes, load_order);
    }
}

fn interleave(positions: &[[f32; 3]], tex_coords: &[[f32; 2]]) -> Vec<Vertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Every triangle contributes its three edges. Shared edges are emitted
/// twice; the overdraw is invisible for line rendering.
fn line_indices(triangle_indices: &[u32]) -> Vec<u32> {
    let mut lines = Vec::with_capacity(triangle_indices.len() * 2);
    for tri in triangle_indices.chunks_exact(3) {
        lines.extend_from_slice(&[tri[0], tri[1], tri[1], tri[2], tri[2], tri[0]]);
    }
    lines
}

pub fn upload_primitive(
    device: &wgpu::Device,
    label: &str,
    vertices: &[Vertex],
    indices: &[u32],
) -> Primitive {
    let lines = line_indices(indices);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} vertices", label)),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} indices", label)),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let line_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{} line indices", label)),
        contents: bytemuck::cast_slice(&lines),
        usage: wgpu::BufferUsages::INDEX,
    });

    Primitive {
        vertex_buffer,
        index_buffer,
        line_index_buffer,
        num_indices: indices.len() as u32,
        num_line_indices: lines.len() as u32,
        num_vertices: vertices.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_indices_expand_each_triangle_to_three_edges() {
        let tris = [0, 1, 2, 2, 3, 0];
        let lines = line_indices(&tris);
        assert_eq!(lines, vec![0, 1, 1, 2, 2, 0, 2, 3, 3, 0, 0, 2]);
    }

    #[test]
    fn line_indices_ignore_trailing_partial_triangle() {
        assert_eq!(line_indices(&[0, 1]), Vec::<u32>::new());
    }

    #[test]
    fn interleave_pads_missing_tex_coords() {
        let verts = interleave(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &[[0.5, 0.5]]);
        assert_eq!(verts[0].tex_coords, [0.5, 0.5]);
        assert_eq!(verts[1].tex_coords, [0.0, 0.0]);
        assert_eq!(verts[1].position, [1.0, 0.0, 0.0]);
    }
}
