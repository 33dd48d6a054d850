//! GPU-side counterparts of the scene's geometry and material descriptors.

use wgpu::util::DeviceExt;

use super::mesh_gen::{self, IndexGroup, Topology};
use crate::gpu::pipeline_helpers::buffer_bind_group;
use crate::scene::{GeometryDesc, MaterialDesc, Shading};

/// Which scene pipeline draws a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineKind {
    /// Lit or unlit triangle meshes.
    Mesh,
    /// Line segments.
    Line,
    /// Camera-facing additive billboards.
    Star,
}

/// Uploaded vertex/index buffers of one geometry.
pub(crate) struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub groups: Vec<IndexGroup>,
    pub pipeline: PipelineKind,
}

impl GpuGeometry {
    pub fn upload(
        device: &wgpu::Device,
        label: &str,
        desc: &GeometryDesc,
    ) -> Self {
        let mesh = mesh_gen::generate(desc);
        let pipeline = match (desc, mesh.topology) {
            (GeometryDesc::Billboard, _) => PipelineKind::Star,
            (_, Topology::Lines) => PipelineKind::Line,
            (_, Topology::Triangles) => PipelineKind::Mesh,
        };
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            groups: mesh.groups,
            pipeline,
        }
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Mirrors `MaterialUniform` in the raster shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MaterialUniform {
    pub color: [f32; 3],
    pub shading: u32,
    pub emissive: [f32; 3],
    pub opacity: f32,
}

impl From<&MaterialDesc> for MaterialUniform {
    fn from(desc: &MaterialDesc) -> Self {
        Self {
            color: desc.color,
            shading: match desc.shading {
                Shading::Basic => 0,
                Shading::Phong => 1,
            },
            emissive: desc.emissive,
            opacity: 1.0,
        }
    }
}

/// Uploaded material uniform and its bind group.
pub(crate) struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn upload(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        desc: &MaterialDesc,
    ) -> Self {
        let uniform = MaterialUniform::from(desc);
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Material", desc.label)),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = buffer_bind_group(
            device,
            &format!("{} Material Bind Group", desc.label),
            layout,
            &[&buffer],
        );
        Self { buffer, bind_group }
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}
