//! wgpu implementation of [`FrameRenderer`].

use rustc_hash::FxHashMap;

use super::postprocess::{BloomPass, CompositePass, ScreenPass};
use super::resources::{GpuGeometry, GpuMaterial};
use super::scene_pass::ScenePass;
use super::{FrameRenderer, RenderError};
use crate::camera::core::Camera;
use crate::error::GridError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::lifecycle::SurfaceId;
use crate::options::Options;
use crate::scene::{GeometryId, MaterialId, Scene};

/// Draws the scene into an HDR target, optionally blooms it, and
/// composites the result onto a window surface.
pub struct GpuRenderer {
    context: RenderContext,
    surface_id: SurfaceId,
    scene_pass: ScenePass,
    bloom: BloomPass,
    bloom_enabled: bool,
    composite: CompositePass,
    geometries: FxHashMap<GeometryId, GpuGeometry>,
    materials: FxHashMap<MaterialId, GpuMaterial>,
    targets_alive: bool,
}

impl GpuRenderer {
    /// Create the device, surface and every pass for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Gpu`] if no adapter/device/surface is available
    /// and [`GridError::Shader`] if a shader fails to compose.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        surface_id: SurfaceId,
        size: (u32, u32),
        options: &Options,
    ) -> Result<Self, GridError> {
        let context = RenderContext::new(target, size).await?;
        let mut composer = ShaderComposer::new()?;

        let scene_pass =
            ScenePass::new(&context, &mut composer, &options.lighting)?;
        let effects = &options.post_processing;
        let bloom = BloomPass::new(
            &context,
            &scene_pass.color.view,
            effects,
            &mut composer,
        )?;
        let composite = CompositePass::new(
            &context,
            &scene_pass.color.view,
            bloom.output_view(),
            effects,
            &mut composer,
        )?;
        log::info!(
            "gpu renderer ready: {:?}, {:?}, bloom {}",
            context.size(),
            context.surface_format(),
            if effects.bloom_enabled { "on" } else { "off" },
        );

        Ok(Self {
            context,
            surface_id,
            scene_pass,
            bloom,
            bloom_enabled: effects.bloom_enabled,
            composite,
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            targets_alive: true,
        })
    }

    /// Blocking wrapper around [`GpuRenderer::new`].
    ///
    /// # Errors
    ///
    /// See [`GpuRenderer::new`].
    #[cfg(feature = "viewer")]
    pub fn new_blocking(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        surface_id: SurfaceId,
        size: (u32, u32),
        options: &Options,
    ) -> Result<Self, GridError> {
        pollster::block_on(Self::new(target, surface_id, size, options))
    }

    /// The underlying device/queue/surface.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Number of uploaded geometries still alive.
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of uploaded materials still alive.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn rebuild_targets(&mut self) {
        self.scene_pass
            .resize(&self.context.device, self.context.size());
        self.bloom.set_input_view(&self.scene_pass.color.view);
        self.bloom.resize(&self.context);
        self.composite
            .set_inputs(&self.scene_pass.color.view, self.bloom.output_view());
        self.composite.resize(&self.context);
    }
}

impl FrameRenderer for GpuRenderer {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn upload(&mut self, scene: &Scene) {
        let device = &self.context.device;
        let table = scene.resources();
        for (id, desc) in table.geometries() {
            let label = format!("Geometry {}", id.0);
            let _ = self
                .geometries
                .entry(id)
                .or_insert_with(|| GpuGeometry::upload(device, &label, desc));
        }
        for (id, desc) in table.materials() {
            let layout = &self.scene_pass.material_layout;
            let _ = self
                .materials
                .entry(id)
                .or_insert_with(|| GpuMaterial::upload(device, layout, desc));
        }
        log::debug!(
            "uploaded {} geometries, {} materials",
            self.geometries.len(),
            self.materials.len()
        );
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || !self.targets_alive {
            return;
        }
        self.context.reconfigure(width, height);
        self.rebuild_targets();
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        if !self.targets_alive {
            return Err(RenderError::Lost);
        }
        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.context.frame_encoder();
        self.scene_pass.encode(
            &self.context,
            &mut encoder,
            scene,
            camera,
            &self.geometries,
            &self.materials,
        );
        if self.bloom_enabled {
            self.bloom.render(&mut encoder);
        }
        self.composite.set_output_view(view);
        self.composite.render(&mut encoder);

        self.context.present(encoder, frame);
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) -> bool {
        self.geometries.remove(&id).is_some_and(|geometry| {
            geometry.destroy();
            true
        })
    }

    fn release_material(&mut self, id: MaterialId) -> bool {
        self.materials.remove(&id).is_some_and(|material| {
            material.destroy();
            true
        })
    }

    fn release_targets(&mut self) {
        if !self.targets_alive {
            return;
        }
        self.targets_alive = false;
        self.scene_pass.release_all();
        self.bloom.release();
        self.composite.release();
        let _ = self.context.release_surface();
        log::debug!("gpu targets released");
    }
}
