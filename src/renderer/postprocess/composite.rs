//! Final screen pass: adds bloom to the HDR scene, applies exposure and
//! writes the clamped result to the swapchain.

use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, draw_fullscreen, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{
    ShaderComposer, ShaderError, COMPOSITE_SHADER,
};
use crate::options::PostProcessingOptions;

/// Composite params, must match WGSL struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeParams {
    /// Bloom contribution; zero when bloom is disabled.
    pub bloom_strength: f32,
    /// Exposure multiplier applied before clamping.
    pub exposure: f32,
    _pad: [f32; 2],
}

impl From<&PostProcessingOptions> for CompositeParams {
    fn from(options: &PostProcessingOptions) -> Self {
        Self {
            bloom_strength: if options.bloom_enabled {
                options.bloom_strength
            } else {
                0.0
            },
            exposure: options.exposure,
            _pad: [0.0; 2],
        }
    }
}

/// Scene + bloom combine into the surface format.
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,

    scene_view: wgpu::TextureView,
    bloom_view: wgpu::TextureView,
    // Set per frame to the acquired swapchain view.
    output_view: Option<wgpu::TextureView>,
}

impl CompositePass {
    /// Composite of `scene_view` and `bloom_view` into the surface format.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if the composite shader fails to compose.
    pub fn new(
        context: &RenderContext,
        scene_view: &wgpu::TextureView,
        bloom_view: &wgpu::TextureView,
        options: &PostProcessingOptions,
        composer: &mut ShaderComposer,
    ) -> Result<Self, ShaderError> {
        let device = &context.device;
        let sampler = linear_sampler(device, "Composite Sampler");
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Composite Params Buffer"),
                contents: bytemuck::bytes_of(&CompositeParams::from(options)),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let layout = Self::create_bind_group_layout(device);
        let shader =
            composer.compose(device, "Composite Shader", COMPOSITE_SHADER)?;
        let pipeline = create_screen_space_pipeline(
            device,
            "Composite",
            &shader,
            context.surface_format(),
            &[&layout],
        );
        let bind_group = Self::create_bind_group(
            device,
            &layout,
            (scene_view, bloom_view),
            &sampler,
            &params_buffer,
        );

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            sampler,
            params_buffer,
            scene_view: scene_view.clone(),
            bloom_view: bloom_view.clone(),
            output_view: None,
        })
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                texture_2d(0),
                texture_2d(1),
                filtering_sampler(2),
                uniform_buffer(3, wgpu::ShaderStages::FRAGMENT),
            ],
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        (scene_view, bloom_view): (&wgpu::TextureView, &wgpu::TextureView),
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Update the external input views. Call [`ScreenPass::resize`]
    /// afterwards to rebuild the bind group.
    pub fn set_inputs(
        &mut self,
        scene_view: &wgpu::TextureView,
        bloom_view: &wgpu::TextureView,
    ) {
        self.scene_view = scene_view.clone();
        self.bloom_view = bloom_view.clone();
    }

    /// Set the swapchain view this frame is written to.
    pub fn set_output_view(&mut self, view: wgpu::TextureView) {
        self.output_view = Some(view);
    }

    /// Upload new strength / exposure values.
    pub fn update_params(
        &self,
        queue: &wgpu::Queue,
        options: &PostProcessingOptions,
    ) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&CompositeParams::from(options)),
        );
    }
}

impl ScreenPass for CompositePass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some(output) = &self.output_view else {
            log::warn!("composite pass has no output view, skipping");
            return;
        };
        draw_fullscreen(
            encoder,
            "Composite Pass",
            output,
            &self.pipeline,
            &self.bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        self.bind_group = Self::create_bind_group(
            &context.device,
            &self.layout,
            (&self.scene_view, &self.bloom_view),
            &self.sampler,
            &self.params_buffer,
        );
    }

    fn release(&mut self) {
        self.output_view = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_bloom_contributes_nothing() {
        let mut options = PostProcessingOptions {
            bloom_strength: 1.5,
            exposure: 1.2,
            ..PostProcessingOptions::default()
        };
        options.bloom_enabled = false;
        let params = CompositeParams::from(&options);
        assert_eq!(params.bloom_strength, 0.0);
        assert_eq!(params.exposure, 1.2);

        options.bloom_enabled = true;
        assert_eq!(CompositeParams::from(&options).bloom_strength, 1.5);
        assert_eq!(size_of::<CompositeParams>(), 16);
    }
}
