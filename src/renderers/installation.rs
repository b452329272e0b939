use std::collections::HashMap;

use wgpu::Queue;

use crate::components::{CameraUniform, MaterialRole, SceneMesh, Transform};
use crate::device::Device;
use crate::math::Rect;
use crate::model::{MeshData, Vertex};
use crate::texture::Texture;

use super::shader_utils;

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshParams {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    // x is 1.0 when the material samples the video texture
    flags: [f32; 4],
}

struct MeshBinding {
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    video_generation: u32,
}

/// The one pass of the installation: unlit fill for plain materials,
/// two-sided fill for the video surfaces, line lists for wireframes.
pub struct InstallationPass {
    camera_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    local_bind_group_layout: wgpu::BindGroupLayout,
    locals: HashMap<String, MeshBinding>,
    fill_pipeline: wgpu::RenderPipeline,
    // Video surfaces are thin shells; back-face culling is disabled so the
    // video reads from both sides
    two_sided_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    white_tex: Texture,
    // Depth buffer matching the XR framebuffer; the surface depth texture
    // has the wrong size in-session
    xr_depth: Option<Texture>,
}

impl InstallationPass {
    pub fn new(device: &Device, color_format: wgpu::TextureFormat, webxr: bool) -> Self {
        let camera_size = std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress;
        let params_size = std::mem::size_of::<MeshParams>() as wgpu::BufferAddress;

        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("[Installation] Globals"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(camera_size),
                    },
                    count: None,
                }],
            });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("[Installation] Camera"),
            size: camera_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("[Installation] Globals"),
            layout: &global_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let local_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("[Installation] Locals"),
                entries: &[
                    // Material texture (video or white filler)
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    // Per-mesh params
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(params_size),
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("[Installation] Pipeline"),
            bind_group_layouts: &[&global_bind_group_layout, &local_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut shader_composer = shader_utils::init_composer();
        let shader_desc = wgpu::ShaderModuleDescriptor {
            label: Some("Installation Shader"),
            source: wgpu::ShaderSource::Naga(std::borrow::Cow::Owned(shader_utils::load_shader!(
                &mut shader_composer,
                "installation.wgsl",
                webxr,
                None
            ))),
        };
        let shader_module = device.create_shader_module(shader_desc);

        let vertex_buffers = [Vertex::desc()];
        let depth_stencil = Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        });
        // The WebXR framebuffer is y-flipped, which also flips the winding
        let front_face = if webxr {
            wgpu::FrontFace::Cw
        } else {
            wgpu::FrontFace::Ccw
        };

        let make_pipeline = |label: &str,
                             topology: wgpu::PrimitiveTopology,
                             cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader_module,
                    entry_point: "vs_main",
                    buffers: &vertex_buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: depth_stencil.clone(),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader_module,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState {
                            alpha: wgpu::BlendComponent::REPLACE,
                            color: wgpu::BlendComponent::REPLACE,
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        };

        let fill_pipeline = make_pipeline(
            "[Installation] Fill",
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
        );
        let two_sided_pipeline = make_pipeline(
            "[Installation] Two-sided",
            wgpu::PrimitiveTopology::TriangleList,
            None,
        );
        let line_pipeline = make_pipeline(
            "[Installation] Wireframe",
            wgpu::PrimitiveTopology::LineList,
            None,
        );

        let white_tex = Texture::from_color(
            device,
            device.queue(),
            [255, 255, 255, 255],
            "[Installation] white",
        );

        InstallationPass {
            camera_buffer,
            global_bind_group,
            local_bind_group_layout,
            locals: Default::default(),
            fill_pipeline,
            two_sided_pipeline,
            line_pipeline,
            white_tex,
            xr_depth: None,
        }
    }

    /// Keep a depth buffer matching the XR framebuffer dimensions.
    pub fn ensure_xr_depth(&mut self, device: &Device, width: u32, height: u32) {
        let recreate = match &self.xr_depth {
            Some(tex) => tex.texture.width() != width || tex.texture.height() != height,
            None => true,
        };
        if recreate {
            self.xr_depth = Some(Texture::create_depth_texture(
                device,
                width,
                height,
                "xr_depth_texture",
            ));
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        color_view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
        device: &Device,
        queue: &Queue,
        nodes: &Vec<(&MeshData, &SceneMesh, &Transform)>,
        camera: CameraUniform,
        clear_color: wgpu::Color,
        video: Option<(&Texture, u32)>,
        viewport: &Option<Rect>,
        clear_color_enabled: bool,
        clear_depth: bool,
    ) -> wgpu::CommandBuffer {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));

        // Per-mesh uniforms and bind groups are prepared before encoding;
        // each mesh owns its buffer so one frame's writes don't clobber
        // each other.
        for (data, mesh, transform) in nodes.iter() {
            let uses_video = mesh.role == MaterialRole::Video && video.is_some();
            let generation = if uses_video { video.unwrap().1 } else { 0 };

            let stale = self
                .locals
                .get(&data.name)
                .map_or(true, |binding| binding.video_generation != generation);
            if stale {
                let texture = if uses_video {
                    video.unwrap().0
                } else {
                    &self.white_tex
                };
                let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("[Installation] Mesh params"),
                    size: std::mem::size_of::<MeshParams>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("[Installation] Locals"),
                    layout: &self.local_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&texture.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: params_buffer.as_entire_binding(),
                        },
                    ],
                });
                self.locals.insert(
                    data.name.clone(),
                    MeshBinding {
                        params_buffer,
                        bind_group,
                        video_generation: generation,
                    },
                );
            }

            let params = MeshParams {
                model: transform.matrix().into(),
                color: mesh.color,
                flags: [uses_video as u32 as f32, 0.0, 0.0, 0.0],
            };
            queue.write_buffer(
                &self.locals[data.name.as_str()].params_buffer,
                0,
                bytemuck::cast_slice(&[params]),
            );
        }

        let depth_view: &wgpu::TextureView = match depth_view {
            Some(view) => view,
            // XR framebuffer-sized depth, see ensure_xr_depth
            None => &self.xr_depth.as_ref().unwrap().view,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: if clear_color_enabled {
                            wgpu::LoadOp::Clear(clear_color)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: if clear_depth {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            if let Some(v) = viewport {
                render_pass.set_viewport(v.x, v.y, v.w, v.h, 0.0, 1.0);
            }

            render_pass.set_bind_group(0, &self.global_bind_group, &[]);

            for (data, mesh, _) in nodes.iter() {
                let pipeline = match mesh.role {
                    MaterialRole::Plain => &self.fill_pipeline,
                    MaterialRole::Video => &self.two_sided_pipeline,
                    MaterialRole::WireFloor => &self.line_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &self.locals[data.name.as_str()].bind_group, &[]);

                for primitive in &data.primitives {
                    render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                    match mesh.role {
                        MaterialRole::WireFloor => {
                            render_pass.set_index_buffer(
                                primitive.line_index_buffer.slice(..),
                                wgpu::IndexFormat::Uint32,
                            );
                            render_pass.draw_indexed(0..primitive.num_line_indices, 0, 0..1);
                        }
                        _ => {
                            render_pass.set_index_buffer(
                                primitive.index_buffer.slice(..),
                                wgpu::IndexFormat::Uint32,
                            );
                            render_pass.draw_indexed(0..primitive.num_indices, 0, 0..1);
                        }
                    }
                }
            }
        }
        encoder.finish()
    }
}
