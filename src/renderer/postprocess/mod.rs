//! Post-processing chain: bloom on the HDR scene, then composite to the
//! surface.

/// Bright-pass extraction and separable blur.
pub mod bloom;
/// Scene + bloom combine, exposure and clamp to the surface.
pub mod composite;
/// Shared interface of the fullscreen passes.
pub mod screen_pass;

pub use bloom::BloomPass;
pub use composite::CompositePass;
pub use screen_pass::ScreenPass;
