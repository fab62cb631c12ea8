use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use outrun_render::ScrollUniforms;
use outrun_scene::{Camera, MeshData, NodeKind, Scene, Shading, Topology};
use std::collections::BTreeMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

const MAX_LIGHTS: usize = 4;
const MAX_INSTANCES: u32 = 4096;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],
    scroll: [f32; 4],
    fog_range: [f32; 4],
    light_pos: [[f32; 4]; MAX_LIGHTS],
    light_color: [[f32; 4]; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
    center: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

/// Vertex and index buffers for one `MeshData`, kept alive with it.
struct GpuMesh {
    _source: Arc<MeshData>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &Arc<MeshData>) -> Self {
        let vertices: Vec<Vertex> = (0..mesh.vertex_count())
            .map(|i| Vertex {
                position: mesh.positions[i],
                normal: mesh.normals[i],
                uv: mesh.uvs[i],
                center: mesh.centers[i],
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_vertices", mesh.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_indices", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(mesh = %mesh.name, vertices = vertices.len(), "mesh uploaded");
        Self {
            _source: mesh.clone(),
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Pipeline a draw goes through. Declaration order is draw order: opaque
/// first, blended last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pass {
    Lit,
    Unlit,
    Terrain,
    Wire,
    Blended,
}

struct Draw {
    pass: Pass,
    mesh: usize,
    instance: u32,
}

/// wgpu renderer for a drive `Scene`.
///
/// Mesh buffers are uploaded the first time a `MeshData` is seen and reused
/// for every node sharing that `Arc`.
pub struct WgpuRenderer {
    pipelines: BTreeMap<Pass, wgpu::RenderPipeline>,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    meshes: BTreeMap<usize, GpuMesh>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh_shader().into()),
        });
        let terrain_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::terrain_shader().into()),
        });

        let builder = PipelineBuilder {
            device,
            layout: &layout,
            format: surface_format,
        };
        let mut pipelines = BTreeMap::new();
        pipelines.insert(
            Pass::Lit,
            builder.build("lit_pipeline", &mesh_shader, "vs_main", "fs_lit", PipelineStyle::OPAQUE),
        );
        pipelines.insert(
            Pass::Unlit,
            builder.build("unlit_pipeline", &mesh_shader, "vs_main", "fs_unlit", PipelineStyle::OPAQUE),
        );
        pipelines.insert(
            Pass::Blended,
            builder.build("blended_pipeline", &mesh_shader, "vs_main", "fs_unlit", PipelineStyle::BLENDED),
        );
        pipelines.insert(
            Pass::Terrain,
            builder.build(
                "terrain_pipeline",
                &terrain_shader,
                "vs_terrain",
                "fs_terrain",
                PipelineStyle::OPAQUE,
            ),
        );
        pipelines.insert(
            Pass::Wire,
            builder.build("wire_pipeline", &terrain_shader, "vs_terrain", "fs_wire", PipelineStyle::LINES),
        );

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: MAX_INSTANCES as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipelines,
            globals_buffer,
            globals_bind_group,
            instance_buffer,
            meshes: BTreeMap::new(),
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Number of distinct meshes uploaded so far.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Draw every visible mesh node of `scene` into `view`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &Camera,
        scene: &Scene,
        uniforms: &ScrollUniforms,
    ) {
        let world_nodes = scene.world_nodes();
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&globals_for(camera, scene, uniforms)),
        );

        let mut instances: Vec<InstanceData> = Vec::new();
        let mut draws: Vec<Draw> = Vec::new();
        for item in &world_nodes {
            let NodeKind::Mesh(mesh) = &item.node.kind else {
                continue;
            };
            if instances.len() >= MAX_INSTANCES as usize {
                tracing::warn!(max = MAX_INSTANCES, "instance buffer full, skipping nodes");
                break;
            }
            let key = Arc::as_ptr(mesh) as usize;
            self.meshes
                .entry(key)
                .or_insert_with(|| GpuMesh::upload(device, mesh));

            let material = &item.node.material;
            let pass = match (material.shading, mesh.topology) {
                (Shading::Terrain, _) => Pass::Terrain,
                (Shading::TerrainWire, _) | (_, Topology::Lines) => Pass::Wire,
                (_, _) if material.color[3] < 1.0 => Pass::Blended,
                (Shading::Lit, _) => Pass::Lit,
                (Shading::Unlit, _) => Pass::Unlit,
            };
            draws.push(Draw {
                pass,
                mesh: key,
                instance: instances.len() as u32,
            });
            instances.push(InstanceData {
                model: item.world.to_cols_array_2d(),
                color: material.color,
                params: [if material.highlighted { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            });
        }
        draws.sort_by_key(|d| d.pass);

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });
        {
            let [r, g, b] = uniforms.fog.color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            let mut current = None;
            for draw in &draws {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                if current != Some(draw.pass) {
                    if let Some(pipeline) = self.pipelines.get(&draw.pass) {
                        pass.set_pipeline(pipeline);
                    }
                    current = Some(draw.pass);
                }
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, draw.instance..draw.instance + 1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Camera, fog, scroll values, and up to four lights in world space.
fn globals_for(camera: &Camera, scene: &Scene, uniforms: &ScrollUniforms) -> Globals {
    let mut globals = Globals {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_pos: camera.eye.extend(1.0).to_array(),
        ambient: [0.0; 4],
        fog_color: [uniforms.fog.color[0], uniforms.fog.color[1], uniforms.fog.color[2], 1.0],
        scroll: [uniforms.time, uniforms.speed, uniforms.scale, uniforms.thickness],
        fog_range: [uniforms.fog.near, uniforms.fog.far, 0.0, 0.0],
        light_pos: [[0.0; 4]; MAX_LIGHTS],
        light_color: [[0.0; 4]; MAX_LIGHTS],
    };

    let mut count = 0;
    for item in scene.world_nodes() {
        let position = item.world.transform_point3(Vec3::ZERO);
        let (color, intensity, pos) = match &item.node.kind {
            NodeKind::AmbientLight { color, intensity } => {
                for c in 0..3 {
                    globals.ambient[c] += color[c] * intensity;
                }
                continue;
            }
            NodeKind::DirectionalLight { color, intensity } => {
                (color, intensity, position.normalize_or_zero().extend(0.0))
            }
            NodeKind::PointLight { color, intensity, .. } => (color, intensity, position.extend(1.0)),
            NodeKind::Group | NodeKind::Mesh(_) => continue,
        };
        if count == MAX_LIGHTS {
            continue;
        }
        globals.light_pos[count] = pos.to_array();
        globals.light_color[count] = [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0];
        count += 1;
    }
    globals.fog_range[2] = count as f32;
    globals
}

#[derive(Clone, Copy)]
struct PipelineStyle {
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
    depth_write: bool,
    cull: Option<wgpu::Face>,
}

impl PipelineStyle {
    const OPAQUE: Self = Self {
        topology: wgpu::PrimitiveTopology::TriangleList,
        blend: wgpu::BlendState::REPLACE,
        depth_write: true,
        cull: None,
    };
    const BLENDED: Self = Self {
        topology: wgpu::PrimitiveTopology::TriangleList,
        blend: wgpu::BlendState::ALPHA_BLENDING,
        depth_write: false,
        cull: None,
    };
    const LINES: Self = Self {
        topology: wgpu::PrimitiveTopology::LineList,
        blend: wgpu::BlendState::ALPHA_BLENDING,
        depth_write: true,
        cull: None,
    };
}

struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
}

impl PipelineBuilder<'_> {
    fn build(
        &self,
        label: &str,
        module: &wgpu::ShaderModule,
        vs: &str,
        fs: &str,
        style: PipelineStyle,
    ) -> wgpu::RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(vs),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                            3 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(style.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: style.topology,
                cull_mode: style.cull,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: style.depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outrun_common::Transform;
    use outrun_scene::SceneNode;

    #[test]
    fn gpu_structs_are_aligned() {
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
    }

    #[test]
    fn globals_collect_lights() {
        let mut scene = Scene::new();
        scene.add(SceneNode::new(
            "ambient",
            NodeKind::AmbientLight {
                color: [1.0, 0.5, 0.0],
                intensity: 0.5,
            },
        ));
        scene.add(
            SceneNode::new(
                "key",
                NodeKind::DirectionalLight {
                    color: [1.0, 1.0, 1.0],
                    intensity: 1.0,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, 10.0, 0.0))),
        );
        let globals = globals_for(&Camera::default(), &scene, &ScrollUniforms::default());
        assert_eq!(globals.ambient[..3], [0.5, 0.25, 0.0]);
        assert_eq!(globals.fog_range[2], 1.0);
        assert_eq!(globals.light_pos[0], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(globals.scroll[1], 47.0);
    }

    #[test]
    fn pass_order_draws_blended_last() {
        assert!(Pass::Lit < Pass::Blended);
        assert!(Pass::Wire < Pass::Blended);
    }
}
