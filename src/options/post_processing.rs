use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Effects", inline)]
#[serde(default)]
/// Bloom and tone-mapping parameters.
pub struct PostProcessingOptions {
    /// Run the bloom passes. When off the HDR scene is only tone-mapped.
    #[schemars(title = "Bloom")]
    pub bloom_enabled: bool,
    /// How strongly the blurred highlights are added back to the scene.
    #[schemars(title = "Bloom Strength", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub bloom_strength: f32,
    /// Spread of the glow; scales the blur kernel and the number of passes.
    #[schemars(title = "Bloom Radius", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub bloom_radius: f32,
    /// Luminance above which pixels contribute to bloom.
    #[schemars(title = "Bloom Threshold", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub bloom_threshold: f32,
    /// Exposure multiplier for tone mapping.
    #[schemars(title = "Exposure", range(min = 0.5, max = 2.0), extend("step" = 0.05))]
    pub exposure: f32,
}

impl Default for PostProcessingOptions {
    fn default() -> Self {
        Self {
            bloom_enabled: false,
            bloom_strength: 1.5,
            bloom_radius: 0.4,
            bloom_threshold: 0.85,
            exposure: 1.0,
        }
    }
}
