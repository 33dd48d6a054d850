//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::GpuInitError;
use crate::gpu::shader_composer::ShaderError;
use crate::lifecycle::HostError;
use crate::renderer::RenderError;

/// Errors produced by the gridscape crate.
#[derive(Debug)]
pub enum GridError {
    /// GPU context initialization failure.
    Gpu(GpuInitError),
    /// WGSL composition or validation failure.
    Shader(ShaderError),
    /// The host container refused an operation during mount.
    Host(HostError),
    /// A frame could not be rendered and the surface cannot be recovered.
    Render(RenderError),
    /// Options failed validation.
    InvalidOptions(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(e) => write!(f, "shader error: {e}"),
            Self::Host(e) => write!(f, "host error: {e}"),
            Self::Render(e) => write!(f, "render error: {e}"),
            Self::InvalidOptions(msg) => {
                write!(f, "invalid options: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Host(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuInitError> for GridError {
    fn from(e: GpuInitError) -> Self {
        Self::Gpu(e)
    }
}

impl From<ShaderError> for GridError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<HostError> for GridError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

impl From<RenderError> for GridError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<std::io::Error> for GridError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
