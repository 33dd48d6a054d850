//! Device, queue and the window surface the grid is presented on.

use std::fmt;

/// Why the GPU could not be brought up for a window.
#[derive(Debug)]
pub enum GpuInitError {
    /// The window handle could not back a surface.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter can present to the surface.
    Adapter(wgpu::RequestAdapterError),
    /// The adapter refused the downlevel device.
    Device(wgpu::RequestDeviceError),
    /// The adapter offers no configuration for the surface.
    NoSurfaceConfig,
}

impl fmt::Display for GpuInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "cannot create surface: {e}"),
            Self::Adapter(e) => write!(f, "no adapter for surface: {e}"),
            Self::Device(e) => write!(f, "cannot open device: {e}"),
            Self::NoSurfaceConfig => {
                f.write_str("adapter has no configuration for the surface")
            }
        }
    }
}

impl std::error::Error for GpuInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::Adapter(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::NoSurfaceConfig => None,
        }
    }
}

/// Smallest surface extent wgpu accepts for a host size.
#[must_use]
pub const fn surface_extent((width, height): (u32, u32)) -> (u32, u32) {
    (if width == 0 { 1 } else { width }, if height == 0 { 1 } else { height })
}

/// Device and queue plus the grid's presentation surface.
///
/// The surface is dropped by [`RenderContext::release_surface`] at unmount;
/// frames acquired afterwards report [`wgpu::SurfaceError::Lost`].
pub struct RenderContext {
    /// Logical device shared by every pass.
    pub device: wgpu::Device,
    /// Submission queue.
    pub queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    /// Open a low-power device able to present to `target`, configured at
    /// `size` with vsync.
    ///
    /// # Errors
    ///
    /// See [`GpuInitError`].
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
    ) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(target)
            .map_err(GpuInitError::Surface)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .map_err(GpuInitError::Adapter)?;
        log::debug!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Grid Device"),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            })
            .await
            .map_err(GpuInitError::Device)?;

        let (width, height) = surface_extent(size);
        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or(GpuInitError::NoSurfaceConfig)?;
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface: Some(surface),
            config,
        })
    }

    /// Format the composite pass writes.
    #[must_use]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Configured surface size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure at a new size; zero extents are ignored.
    pub fn reconfigure(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    /// Next swapchain texture.
    ///
    /// # Errors
    ///
    /// Whatever the surface reports, or [`wgpu::SurfaceError::Lost`] once
    /// the surface has been released.
    pub fn acquire_frame(
        &self,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        match &self.surface {
            Some(surface) => surface.get_current_texture(),
            None => Err(wgpu::SurfaceError::Lost),
        }
    }

    /// Encoder for one frame's passes.
    #[must_use]
    pub fn frame_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Grid Frame"),
            })
    }

    /// Submit the frame's commands and present it.
    pub fn present(
        &self,
        encoder: wgpu::CommandEncoder,
        frame: wgpu::SurfaceTexture,
    ) {
        let _ = self.queue.submit([encoder.finish()]);
        frame.present();
    }

    /// Drop the surface. `false` if it was already gone.
    pub fn release_surface(&mut self) -> bool {
        self.surface.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_extent_never_zero() {
        assert_eq!(surface_extent((0, 0)), (1, 1));
        assert_eq!(surface_extent((640, 0)), (640, 1));
        assert_eq!(surface_extent((900, 500)), (900, 500));
    }

    #[test]
    fn missing_config_has_no_source() {
        use std::error::Error;
        let err = GpuInitError::NoSurfaceConfig;
        assert!(err.source().is_none());
        assert!(err.to_string().contains("surface"));
    }
}
