//! CPU-only renderer that records what it was asked to do.
//!
//! Used by tests and by hosts without a GPU. It keeps the same bookkeeping
//! as [`GpuRenderer`](super::GpuRenderer): resources exist between
//! [`upload`](FrameRenderer::upload) and their release, and releasing
//! something twice frees nothing the second time.

use rustc_hash::FxHashSet;

use super::{FrameRenderer, RenderError};
use crate::camera::core::Camera;
use crate::lifecycle::SurfaceId;
use crate::scene::{GeometryId, MaterialId, Scene};

/// Renderer that draws nothing and counts everything.
#[derive(Debug)]
pub struct HeadlessRenderer {
    surface: SurfaceId,
    size: (u32, u32),
    geometries: FxHashSet<GeometryId>,
    materials: FxHashSet<MaterialId>,
    targets_alive: bool,

    frames: u64,
    resizes: u64,
    geometries_released: usize,
    materials_released: usize,
    last_aspect: Option<f32>,
    pending_failure: Option<RenderError>,
}

impl HeadlessRenderer {
    /// Renderer for a surface of the given size.
    #[must_use]
    pub fn new(surface: SurfaceId, (width, height): (u32, u32)) -> Self {
        Self {
            surface,
            size: (width.max(1), height.max(1)),
            geometries: FxHashSet::default(),
            materials: FxHashSet::default(),
            targets_alive: true,
            frames: 0,
            resizes: 0,
            geometries_released: 0,
            materials_released: 0,
            last_aspect: None,
            pending_failure: None,
        }
    }

    /// Current target size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Frames successfully rendered.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Effective (non-zero) resizes applied.
    #[must_use]
    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Geometries currently uploaded.
    #[must_use]
    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    /// Materials currently uploaded.
    #[must_use]
    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    /// Geometries freed so far.
    #[must_use]
    pub fn geometries_released(&self) -> usize {
        self.geometries_released
    }

    /// Materials freed so far.
    #[must_use]
    pub fn materials_released(&self) -> usize {
        self.materials_released
    }

    /// Whether the surface and render targets still exist.
    #[must_use]
    pub fn targets_alive(&self) -> bool {
        self.targets_alive
    }

    /// Camera aspect seen by the last rendered frame.
    #[must_use]
    pub fn last_aspect(&self) -> Option<f32> {
        self.last_aspect
    }

    /// Make the next [`render`](FrameRenderer::render) fail with `error`.
    pub fn fail_next_frame(&mut self, error: RenderError) {
        self.pending_failure = Some(error);
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    fn upload(&mut self, scene: &Scene) {
        let resources = scene.resources();
        self.geometries.extend(resources.geometries().map(|(id, _)| id));
        self.materials.extend(resources.materials().map(|(id, _)| id));
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || !self.targets_alive {
            return;
        }
        self.size = (width, height);
        self.resizes += 1;
    }

    fn render(
        &mut self,
        _scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        if let Some(error) = self.pending_failure.take() {
            return Err(error);
        }
        if !self.targets_alive {
            return Err(RenderError::Lost);
        }
        self.frames += 1;
        self.last_aspect = Some(camera.aspect);
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) -> bool {
        let released = self.geometries.remove(&id);
        if released {
            self.geometries_released += 1;
        }
        released
    }

    fn release_material(&mut self, id: MaterialId) -> bool {
        let released = self.materials.remove(&id);
        if released {
            self.materials_released += 1;
        }
        released
    }

    fn release_targets(&mut self) {
        self.targets_alive = false;
    }
}
