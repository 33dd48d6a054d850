use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Ambient plus one directional light, applied to lit materials.
pub struct LightingOptions {
    /// Ambient light color.
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    /// Ambient light intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 4.0), extend("step" = 0.1))]
    pub ambient_intensity: f32,
    /// Direction the directional light shines from (need not be unit).
    #[schemars(skip)]
    pub key_direction: [f32; 3],
    /// Directional light color.
    #[schemars(skip)]
    pub key_color: [f32; 3],
    /// Directional light intensity.
    #[schemars(title = "Key Light", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub key_intensity: f32,
    /// Specular exponent for lit materials.
    #[schemars(skip)]
    pub shininess: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient_color: [0.25, 0.25, 0.25],
            ambient_intensity: 2.0,
            key_direction: [1.0, 1.0, 1.0],
            key_color: [1.0, 1.0, 1.0],
            key_intensity: 1.0,
            shininess: 30.0,
        }
    }
}
