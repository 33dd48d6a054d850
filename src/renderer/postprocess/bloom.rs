//! Bloom post-processing pass: extracts bright pixels and blurs them into a
//! soft glow.
//!
//! Pipeline: threshold extraction into a half-resolution target, then
//! `iterations` rounds of separable Gaussian blur ping-ponging between two
//! half-resolution targets. The composite pass adds the result to the scene.

use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, draw_fullscreen, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer, HDR_FORMAT,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{
    ShaderComposer, ShaderError, BLOOM_BLUR_SHADER, BLOOM_THRESHOLD_SHADER,
};
use crate::gpu::texture::RenderTarget;
use crate::options::PostProcessingOptions;

/// Threshold params, must match WGSL struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ThresholdParams {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

/// Blur direction params, must match WGSL struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
}

/// Blur rounds for a bloom radius in `[0, 1]`: one at zero, five at one.
#[must_use]
pub fn blur_iterations(radius: f32) -> u32 {
    1 + (radius.clamp(0.0, 1.0) * 4.0).round() as u32
}

/// Distance between blur taps, in texels.
fn tap_spread(radius: f32) -> f32 {
    1.0 + radius.clamp(0.0, 1.0)
}

fn half_size((width, height): (u32, u32)) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Bright-pass + blur chain.
pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    threshold_layout: wgpu::BindGroupLayout,
    threshold_bind_group: wgpu::BindGroup,
    threshold_buffer: wgpu::Buffer,

    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    // [0] = horizontal (ping -> pong), [1] = vertical (pong -> ping)
    blur_bind_groups: [wgpu::BindGroup; 2],
    blur_buffers: [wgpu::Buffer; 2],

    ping: RenderTarget,
    pong: RenderTarget,
    input_view: wgpu::TextureView,
    sampler: wgpu::Sampler,

    iterations: u32,
    spread: f32,
    size: (u32, u32),
}

impl BloomPass {
    /// Bloom reading from `input_view` (the HDR scene color).
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a bloom shader fails to compose.
    pub fn new(
        context: &RenderContext,
        input_view: &wgpu::TextureView,
        options: &PostProcessingOptions,
        composer: &mut ShaderComposer,
    ) -> Result<Self, ShaderError> {
        let device = &context.device;
        let size = half_size(context.size());
        let sampler = linear_sampler(device, "Bloom Sampler");

        let params = ThresholdParams {
            threshold: options.bloom_threshold,
            smooth_width: 0.01,
            _pad: [0.0; 2],
        };
        let threshold_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Threshold Buffer"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let layout_entries = [
            texture_2d(0),
            filtering_sampler(1),
            uniform_buffer(2, wgpu::ShaderStages::FRAGMENT),
        ];
        let threshold_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Threshold Layout"),
                entries: &layout_entries,
            });
        let blur_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Blur Layout"),
                entries: &layout_entries,
            });

        let threshold_shader = composer.compose(
            device,
            "Bloom Threshold Shader",
            BLOOM_THRESHOLD_SHADER,
        )?;
        let blur_shader =
            composer.compose(device, "Bloom Blur Shader", BLOOM_BLUR_SHADER)?;
        let threshold_pipeline = create_screen_space_pipeline(
            device,
            "Bloom Threshold",
            &threshold_shader,
            HDR_FORMAT,
            &[&threshold_layout],
        );
        let blur_pipeline = create_screen_space_pipeline(
            device,
            "Bloom Blur",
            &blur_shader,
            HDR_FORMAT,
            &[&blur_layout],
        );

        let spread = tap_spread(options.bloom_radius);
        let blur_buffers = [[spread, 0.0], [0.0, spread]].map(|direction| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Blur Params"),
                contents: bytemuck::bytes_of(&BlurParams {
                    texel_size: texel_size(size),
                    direction,
                }),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            })
        });

        let ping = RenderTarget::new(device, "Bloom Ping", size, HDR_FORMAT);
        let pong = RenderTarget::new(device, "Bloom Pong", size, HDR_FORMAT);

        let threshold_bind_group = sampled_bind_group(
            device,
            "Bloom Threshold Bind Group",
            &threshold_layout,
            input_view,
            &sampler,
            &threshold_buffer,
        );
        let blur_bind_groups = Self::create_blur_bind_groups(
            device,
            &blur_layout,
            (&ping, &pong),
            &sampler,
            &blur_buffers,
        );

        Ok(Self {
            threshold_pipeline,
            threshold_layout,
            threshold_bind_group,
            threshold_buffer,
            blur_pipeline,
            blur_layout,
            blur_bind_groups,
            blur_buffers,
            ping,
            pong,
            input_view: input_view.clone(),
            sampler,
            iterations: blur_iterations(options.bloom_radius),
            spread,
            size,
        })
    }

    fn create_blur_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        (ping, pong): (&RenderTarget, &RenderTarget),
        sampler: &wgpu::Sampler,
        buffers: &[wgpu::Buffer; 2],
    ) -> [wgpu::BindGroup; 2] {
        [
            sampled_bind_group(
                device,
                "Bloom Blur H Bind Group",
                layout,
                &ping.view,
                sampler,
                &buffers[0],
            ),
            sampled_bind_group(
                device,
                "Bloom Blur V Bind Group",
                layout,
                &pong.view,
                sampler,
                &buffers[1],
            ),
        ]
    }

    /// The blurred bright-pass result.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.ping.view
    }

    /// Point the pass at a new scene color view. Call [`ScreenPass::resize`]
    /// afterwards.
    pub fn set_input_view(&mut self, view: &wgpu::TextureView) {
        self.input_view = view.clone();
    }
}

impl ScreenPass for BloomPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        draw_fullscreen(
            encoder,
            "Bloom Threshold Pass",
            &self.ping.view,
            &self.threshold_pipeline,
            &self.threshold_bind_group,
        );
        for _ in 0..self.iterations {
            draw_fullscreen(
                encoder,
                "Bloom Blur H Pass",
                &self.pong.view,
                &self.blur_pipeline,
                &self.blur_bind_groups[0],
            );
            draw_fullscreen(
                encoder,
                "Bloom Blur V Pass",
                &self.ping.view,
                &self.blur_pipeline,
                &self.blur_bind_groups[1],
            );
        }
    }

    fn resize(&mut self, context: &RenderContext) {
        let device = &context.device;
        self.size = half_size(context.size());
        self.release();
        self.ping = RenderTarget::new(device, "Bloom Ping", self.size, HDR_FORMAT);
        self.pong = RenderTarget::new(device, "Bloom Pong", self.size, HDR_FORMAT);

        for (buffer, direction) in self
            .blur_buffers
            .iter()
            .zip([[self.spread, 0.0], [0.0, self.spread]])
        {
            context.queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&BlurParams {
                    texel_size: texel_size(self.size),
                    direction,
                }),
            );
        }

        self.threshold_bind_group = sampled_bind_group(
            device,
            "Bloom Threshold Bind Group",
            &self.threshold_layout,
            &self.input_view,
            &self.sampler,
            &self.threshold_buffer,
        );
        self.blur_bind_groups = Self::create_blur_bind_groups(
            device,
            &self.blur_layout,
            (&self.ping, &self.pong),
            &self.sampler,
            &self.blur_buffers,
        );
    }

    fn release(&mut self) {
        self.ping.destroy();
        self.pong.destroy();
    }
}

fn texel_size((width, height): (u32, u32)) -> [f32; 2] {
    [1.0 / width as f32, 1.0 / height as f32]
}

/// Texture + sampler + params bind group shared by the bloom layouts.
fn sampled_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    params: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params.as_entire_binding(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_scale_with_radius() {
        assert_eq!(blur_iterations(0.0), 1);
        assert_eq!(blur_iterations(0.4), 3);
        assert_eq!(blur_iterations(1.0), 5);
        assert_eq!(blur_iterations(7.0), 5);
        assert_eq!(blur_iterations(f32::NAN.max(0.0)), 1);
    }

    #[test]
    fn half_size_never_zero() {
        assert_eq!(half_size((900, 500)), (450, 250));
        assert_eq!(half_size((1, 1)), (1, 1));
    }

    #[test]
    fn params_match_wgsl_layout() {
        assert_eq!(size_of::<ThresholdParams>(), 16);
        assert_eq!(size_of::<BlurParams>(), 16);
    }
}
