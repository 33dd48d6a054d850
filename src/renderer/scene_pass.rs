//! Scene pass: draws every visual object into the HDR color target.
//!
//! Objects sharing a geometry are drawn as one instanced batch; each index
//! group of the geometry is drawn with its own material. Opaque batches go
//! first, transparent ones (stars) after, blended additively without depth
//! writes.

use std::ops::Range;

use rustc_hash::FxHashMap;

use super::pipeline_util::{
    depth_stencil_state, hdr_fragment_target, ADDITIVE_BLEND,
};
use super::resources::{GpuGeometry, GpuMaterial, PipelineKind};
use crate::camera::core::{Camera, CameraUniform};
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers::{
    buffer_bind_group, uniform_buffer, DEPTH_FORMAT, HDR_FORMAT,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{
    ShaderComposer, ShaderError, MESH_SHADER, STAR_SHADER,
};
use crate::gpu::texture::RenderTarget;
use crate::options::LightingOptions;
use crate::renderer::mesh_gen::MeshVertex;
use crate::scene::{GeometryId, MaterialId, Renderable, Scene};

// ---------------------------------------------------------------------------
// GPU structs
// ---------------------------------------------------------------------------

/// Per-instance data; mirrors `InstanceInput` in the raster shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct InstanceRaw {
    pub offset: [f32; 3],
    pub scale: f32,
    pub emissive: f32,
    pub opacity: f32,
}

impl InstanceRaw {
    fn at(offset: glam::Vec3) -> Self {
        Self {
            offset: offset.to_array(),
            scale: 1.0,
            emissive: 0.0,
            opacity: 1.0,
        }
    }
}

/// Mirrors `LightingUniform` in `modules/lighting.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LightingUniform {
    ambient: [f32; 3],
    shininess: f32,
    key_direction: [f32; 3],
    pad_a: f32,
    key_color: [f32; 3],
    pad_b: f32,
}

impl From<&LightingOptions> for LightingUniform {
    fn from(options: &LightingOptions) -> Self {
        let scale = |c: [f32; 3], k: f32| [c[0] * k, c[1] * k, c[2] * k];
        let direction = glam::Vec3::from(options.key_direction)
            .try_normalize()
            .unwrap_or(glam::Vec3::Y);
        Self {
            ambient: scale(options.ambient_color, options.ambient_intensity),
            shininess: options.shininess,
            key_direction: direction.to_array(),
            pad_a: 0.0,
            key_color: scale(options.key_color, options.key_intensity),
            pad_b: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

/// One instanced draw of a geometry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Draw<'a> {
    pub geometry: GeometryId,
    pub materials: &'a [MaterialId],
    pub instances: Range<u32>,
    pub transparent: bool,
}

/// Instance data for one frame and the draws that index into it.
#[derive(Debug, Default)]
pub(crate) struct FrameBatches<'a> {
    pub instances: Vec<InstanceRaw>,
    pub draws: Vec<Draw<'a>>,
}

/// Accumulates instances per geometry in first-seen order.
#[derive(Default)]
struct Batcher<'a> {
    index: FxHashMap<GeometryId, usize>,
    pending: Vec<(&'a Renderable, Vec<InstanceRaw>)>,
}

impl<'a> Batcher<'a> {
    fn push(&mut self, renderable: &'a Renderable, instance: InstanceRaw) {
        let pending = &mut self.pending;
        let slot = *self.index.entry(renderable.geometry).or_insert_with(|| {
            pending.push((renderable, Vec::new()));
            pending.len() - 1
        });
        pending[slot].1.push(instance);
    }
}

/// Group the scene's objects by geometry, in first-seen order, opaque
/// before transparent.
pub(crate) fn build_batches(scene: &Scene) -> FrameBatches<'_> {
    let mut batcher = Batcher::default();
    for tower in scene.towers() {
        batcher.push(&tower.renderable, InstanceRaw::at(tower.position));
    }
    for node in scene.nodes() {
        batcher.push(
            &node.renderable,
            InstanceRaw {
                scale: node.scale,
                emissive: node.emissive().intensity(),
                ..InstanceRaw::at(node.position)
            },
        );
    }
    for line in scene.lines() {
        // segment vertices are already in world space
        batcher.push(&line.renderable, InstanceRaw::at(glam::Vec3::ZERO));
    }
    for particle in scene.particles() {
        batcher.push(&particle.renderable, InstanceRaw::at(particle.position));
    }
    for star in scene.stars() {
        batcher.push(
            &star.renderable,
            InstanceRaw {
                scale: star.scale,
                opacity: star.opacity,
                ..InstanceRaw::at(star.position)
            },
        );
    }

    let resources = scene.resources();
    let mut frame = FrameBatches::default();
    for (renderable, instances) in batcher.pending {
        let start = frame.instances.len() as u32;
        frame.instances.extend_from_slice(&instances);
        let materials = renderable.materials.ids();
        frame.draws.push(Draw {
            geometry: renderable.geometry,
            materials,
            instances: start..frame.instances.len() as u32,
            transparent: materials.iter().any(|&id| {
                resources.material(id).is_some_and(|m| m.transparent)
            }),
        });
    }
    frame.draws.sort_by_key(|draw| draw.transparent);
    frame
}

/// Material for the `group`-th index group: one per group, the last one
/// repeating if there are fewer materials than groups.
pub(crate) fn material_for_group(
    materials: &[MaterialId],
    group: usize,
) -> Option<MaterialId> {
    materials.get(group).or(materials.last()).copied()
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// Pipelines, per-frame uniforms and targets of the scene pass.
pub(crate) struct ScenePass {
    frame_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    pub material_layout: wgpu::BindGroupLayout,

    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,

    instances: TypedBuffer<InstanceRaw>,
    uniform: CameraUniform,

    pub color: RenderTarget,
    depth: RenderTarget,
}

impl ScenePass {
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        lighting: &LightingOptions,
    ) -> Result<Self, ShaderError> {
        let device = &context.device;
        let size = context.size();

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Frame Layout"),
                entries: &[
                    uniform_buffer(
                        0,
                        wgpu::ShaderStages::VERTEX
                            | wgpu::ShaderStages::FRAGMENT,
                    ),
                    uniform_buffer(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Layout"),
                entries: &[uniform_buffer(0, wgpu::ShaderStages::FRAGMENT)],
            });

        let uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Buffer"),
            size: size_of::<LightingUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(
            &lighting_buffer,
            0,
            bytemuck::bytes_of(&LightingUniform::from(lighting)),
        );
        let frame_bind_group = buffer_bind_group(
            device,
            "Scene Frame Bind Group",
            &frame_layout,
            &[&camera_buffer, &lighting_buffer],
        );

        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Scene Pipeline Layout"),
                bind_group_layouts: &[&frame_layout, &material_layout],
                push_constant_ranges: &[],
            });
        let mesh_shader = composer.compose(device, "Mesh Shader", MESH_SHADER)?;
        let star_shader = composer.compose(device, "Star Shader", STAR_SHADER)?;

        let mesh_pipeline = Self::create_pipeline(
            device,
            "Mesh",
            &layout,
            &mesh_shader,
            wgpu::PrimitiveTopology::TriangleList,
            None,
        );
        let line_pipeline = Self::create_pipeline(
            device,
            "Line",
            &layout,
            &mesh_shader,
            wgpu::PrimitiveTopology::LineList,
            None,
        );
        let star_pipeline = Self::create_pipeline(
            device,
            "Star",
            &layout,
            &star_shader,
            wgpu::PrimitiveTopology::TriangleList,
            Some(ADDITIVE_BLEND),
        );

        Ok(Self {
            frame_bind_group,
            camera_buffer,
            lighting_buffer,
            material_layout,
            mesh_pipeline,
            line_pipeline,
            star_pipeline,
            instances: TypedBuffer::with_capacity(
                device,
                "Instance Buffer",
                1024,
                wgpu::BufferUsages::VERTEX,
            ),
            uniform,
            color: RenderTarget::new(device, "Scene HDR Color", size, HDR_FORMAT),
            depth: RenderTarget::new(device, "Scene Depth", size, DEPTH_FORMAT),
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        topology: wgpu::PrimitiveTopology,
        blend: Option<wgpu::BlendState>,
    ) -> wgpu::RenderPipeline {
        let vertex_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                ],
            },
            wgpu::VertexBufferLayout {
                array_stride: size_of::<InstanceRaw>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    2 => Float32x3,
                    3 => Float32,
                    4 => Float32,
                    5 => Float32,
                ],
            },
        ];
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} Pipeline")),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &hdr_fragment_target(blend),
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(blend.is_none())),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Recreate the color and depth targets at the new size.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.release();
        self.color = RenderTarget::new(device, "Scene HDR Color", size, HDR_FORMAT);
        self.depth = RenderTarget::new(device, "Scene Depth", size, DEPTH_FORMAT);
    }

    /// Free targets and per-frame buffers.
    pub fn release(&mut self) {
        self.color.destroy();
        self.depth.destroy();
    }

    /// Free everything, including uniforms and the instance buffer.
    pub fn release_all(&mut self) {
        self.release();
        self.instances.destroy();
        self.camera_buffer.destroy();
        self.lighting_buffer.destroy();
    }

    /// Encode the scene pass into `encoder`.
    pub fn encode(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &Camera,
        geometries: &FxHashMap<GeometryId, GpuGeometry>,
        materials: &FxHashMap<MaterialId, GpuMaterial>,
    ) {
        self.uniform.update_view_proj(camera);
        context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.uniform),
        );

        let frame = build_batches(scene);
        let _ = self
            .instances
            .write(&context.device, &context.queue, &frame.instances);

        let [r, g, b] = scene.background();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(r),
                        g: f64::from(g),
                        b: f64::from(b),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if frame.instances.is_empty() {
            return;
        }
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_vertex_buffer(1, self.instances.buffer().slice(..));

        for draw in &frame.draws {
            let Some(geometry) = geometries.get(&draw.geometry) else {
                continue;
            };
            pass.set_pipeline(match geometry.pipeline {
                PipelineKind::Mesh => &self.mesh_pipeline,
                PipelineKind::Line => &self.line_pipeline,
                PipelineKind::Star => &self.star_pipeline,
            });
            pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            pass.set_index_buffer(
                geometry.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            for (i, group) in geometry.groups.iter().enumerate() {
                let Some(material) = material_for_group(draw.materials, i)
                    .and_then(|id| materials.get(&id))
                else {
                    continue;
                };
                pass.set_bind_group(1, &material.bind_group, &[]);
                pass.draw_indexed(
                    group.start..group.start + group.count,
                    0,
                    draw.instances.clone(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::options::Options;
    use crate::scene::SceneBuilder;

    fn scene(options: &Options) -> Scene {
        SceneBuilder::new(options).build(&mut StdRng::seed_from_u64(3))
    }

    #[test]
    fn gpu_struct_sizes() {
        assert_eq!(size_of::<InstanceRaw>(), 24);
        assert_eq!(size_of::<LightingUniform>(), 48);
    }

    #[test]
    fn batches_group_by_geometry() {
        let scene = scene(&Options::enhanced());
        let frame = build_batches(&scene);

        // towers, nodes, 60 lines, particles, stars
        assert_eq!(frame.draws.len(), 1 + 1 + 60 + 1 + 1);
        assert_eq!(frame.instances.len(), scene.object_count());

        let tower = &frame.draws[0];
        assert_eq!(tower.instances, 0..36);
        assert_eq!(tower.materials.len(), 3);

        // the star batch is the only transparent one and comes last
        let last = frame.draws.last().unwrap();
        assert!(last.transparent);
        assert_eq!(last.instances.len(), 500);
        assert_eq!(frame.draws.iter().filter(|d| d.transparent).count(), 1);
    }

    #[test]
    fn instance_ranges_are_contiguous() {
        let scene = scene(&Options::classic());
        let frame = build_batches(&scene);
        let mut next = 0;
        for draw in &frame.draws {
            assert_eq!(draw.instances.start, next);
            next = draw.instances.end;
        }
        assert_eq!(next as usize, frame.instances.len());
    }

    #[test]
    fn node_instances_carry_scale_and_glow() {
        let mut scene = scene(&Options::classic());
        scene.nodes_mut()[0].scale = 0.7;
        scene.nodes()[0].emissive().flash(2.0);
        let frame = build_batches(&scene);
        let first_node = frame.draws[1].instances.start as usize;
        assert_eq!(frame.instances[first_node].scale, 0.7);
        assert_eq!(frame.instances[first_node].emissive, 2.0);
    }

    #[test]
    fn materials_map_to_groups() {
        let ids = [MaterialId(0), MaterialId(1), MaterialId(2)];
        assert_eq!(material_for_group(&ids, 1), Some(MaterialId(1)));
        assert_eq!(material_for_group(&ids[..1], 2), Some(MaterialId(0)));
        assert_eq!(material_for_group(&[], 0), None);
    }

    #[test]
    fn lighting_premultiplies_intensity() {
        let uniform = LightingUniform::from(&LightingOptions::default());
        assert!((uniform.ambient[0] - 0.5).abs() < 1e-6);
        let dir = glam::Vec3::from(uniform.key_direction);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
