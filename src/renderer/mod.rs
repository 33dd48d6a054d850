//! Rendering backends for the grid scene.
//!
//! [`FrameRenderer`] is the seam between the scene/lifecycle code and the
//! graphics API. [`gpu::GpuRenderer`] draws with wgpu (scene pass into an HDR
//! target, optional bloom, composite to the surface);
//! [`headless::HeadlessRenderer`] records what it was asked to do and is
//! what the lifecycle tests mount.

use std::fmt;

use crate::camera::core::Camera;
use crate::lifecycle::SurfaceId;
use crate::scene::{GeometryId, MaterialId, Scene};

pub mod gpu;
pub mod headless;
pub mod mesh_gen;
pub(crate) mod pipeline_util;
pub mod postprocess;
pub(crate) mod resources;
pub(crate) mod scene_pass;

pub use gpu::GpuRenderer;
pub use headless::HeadlessRenderer;

/// A frame could not be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The surface no longer matches the window and must be reconfigured.
    Outdated,
    /// The surface was lost and must be reconfigured.
    Lost,
    /// Acquiring the next surface texture timed out.
    Timeout,
    /// The GPU ran out of memory.
    OutOfMemory,
    /// Any other backend failure.
    Other(String),
}

impl RenderError {
    /// Whether reconfiguring the surface at the current size may fix it.
    #[must_use]
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, Self::Outdated | Self::Lost)
    }

    /// Whether the frame should just be skipped.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outdated => write!(f, "surface outdated"),
            Self::Lost => write!(f, "surface lost"),
            Self::Timeout => write!(f, "timed out acquiring surface texture"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Outdated => Self::Outdated,
            wgpu::SurfaceError::Lost => Self::Lost,
            wgpu::SurfaceError::Timeout => Self::Timeout,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Graphics backend driven by the viewport and lifecycle code.
///
/// Resources are keyed by the ids in the scene's
/// [`ResourceTable`](crate::scene::ResourceTable). Each release method
/// returns whether something was actually freed, so releasing an id twice
/// is harmless.
pub trait FrameRenderer {
    /// Identifier of the output surface, for attaching it to a host.
    fn surface_id(&self) -> SurfaceId;

    /// Create backing resources for every descriptor in the scene.
    fn upload(&mut self, scene: &Scene);

    /// Resize the surface and every size-dependent target. Zero sizes are
    /// ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame of `scene` as seen by `camera`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the surface cannot provide a frame.
    fn render(&mut self, scene: &Scene, camera: &Camera)
        -> Result<(), RenderError>;

    /// Free the backing resource of a geometry.
    fn release_geometry(&mut self, id: GeometryId) -> bool;

    /// Free the backing resource of a material.
    fn release_material(&mut self, id: MaterialId) -> bool;

    /// Free the surface and every render/post-processing target. Idempotent.
    fn release_targets(&mut self);
}
