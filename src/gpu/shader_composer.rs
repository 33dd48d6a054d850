use std::borrow::Cow;
use std::fmt;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

/// A WGSL source compiled into the crate: `(source, file_path)`.
pub type ShaderSource = (&'static str, &'static str);

/// Scene pass: instanced meshes and line segments.
pub const MESH_SHADER: ShaderSource = (
    include_str!("../../assets/shaders/raster/mesh.wgsl"),
    "raster/mesh.wgsl",
);
/// Scene pass: star billboards.
pub const STAR_SHADER: ShaderSource = (
    include_str!("../../assets/shaders/raster/star.wgsl"),
    "raster/star.wgsl",
);
/// Bloom: bright-pass extraction.
pub const BLOOM_THRESHOLD_SHADER: ShaderSource = (
    include_str!("../../assets/shaders/screen/bloom_threshold.wgsl"),
    "screen/bloom_threshold.wgsl",
);
/// Bloom: separable Gaussian blur.
pub const BLOOM_BLUR_SHADER: ShaderSource = (
    include_str!("../../assets/shaders/screen/bloom_blur.wgsl"),
    "screen/bloom_blur.wgsl",
);
/// Final composite to the surface.
pub const COMPOSITE_SHADER: ShaderSource = (
    include_str!("../../assets/shaders/screen/composite.wgsl"),
    "screen/composite.wgsl",
);

/// Shared modules in dependency order.
const MODULES: &[ShaderSource] = &[
    (
        include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        "modules/fullscreen.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/camera.wgsl"),
        "modules/camera.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/lighting.wgsl"),
        "modules/lighting.wgsl",
    ),
];

/// A shader failed to register or compose.
#[derive(Debug)]
pub struct ShaderError {
    /// File path of the offending shader.
    pub file_path: &'static str,
    /// The composer's diagnostic.
    pub source: Box<ComposerError>,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader '{}': {}", self.file_path, self.source)
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming shaders
/// use `#import gridscape::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

impl fmt::Debug for ShaderComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderComposer").finish_non_exhaustive()
    }
}

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a shared module fails to parse.
    pub fn new() -> Result<Self, ShaderError> {
        let mut composer = Composer::default();
        for &(source, file_path) in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| ShaderError {
                    file_path,
                    source: Box::new(e),
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose a shader (which may contain `#import` directives) into a
    /// `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        shader: ShaderSource,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader into a `naga::Module` without creating a wgpu shader
    /// module. Useful for testing shader composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if composition fails.
    pub fn compose_naga(
        &mut self,
        (source, file_path): ShaderSource,
    ) -> Result<naga::Module, ShaderError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| ShaderError {
                file_path,
                source: Box::new(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in [
            MESH_SHADER,
            STAR_SHADER,
            BLOOM_THRESHOLD_SHADER,
            BLOOM_BLUR_SHADER,
            COMPOSITE_SHADER,
        ] {
            let module = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{e}"));
            let names: Vec<&str> = module
                .entry_points
                .iter()
                .map(|ep| ep.name.as_str())
                .collect();
            assert!(names.contains(&"vs_main"), "{}: {names:?}", shader.1);
            assert!(names.contains(&"fs_main"), "{}: {names:?}", shader.1);
        }
    }

    #[test]
    fn lit_mesh_shader_keeps_lighting_struct_layout() {
        let mut composer = ShaderComposer::new().unwrap();
        let module = composer.compose_naga(MESH_SHADER).unwrap();
        let lighting = module
            .types
            .iter()
            .find_map(|(_, ty)| match &ty.inner {
                naga::TypeInner::Struct { members, span } => members
                    .iter()
                    .any(|m| m.name.as_deref() == Some("key_direction"))
                    .then_some((members.len(), *span)),
                _ => None,
            })
            .unwrap_or_else(|| panic!("lighting struct missing from mesh shader"));
        assert_eq!(lighting, (6, 48));
    }

    // Composable module identifiers ending in `_<digits>` collide with
    // naga's renaming and are rejected by the composer.
    #[test]
    fn module_identifiers_avoid_numeric_suffixes() {
        for &(source, file_path) in MODULES {
            for word in source.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
                let Some((_, tail)) = word.rsplit_once('_') else {
                    continue;
                };
                assert!(
                    tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()),
                    "{file_path}: `{word}`"
                );
            }
        }
    }
}
