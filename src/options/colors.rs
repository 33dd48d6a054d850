use serde::{Deserialize, Serialize};

/// Color palette for the grid and the background.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorOptions {
    /// Clear color behind the scene.
    pub background: [f32; 3],
    /// Tower body color.
    pub tower: [f32; 3],
    /// Tower cap color (top and bottom faces).
    pub tower_cap: [f32; 3],
    /// Node base color.
    pub node: [f32; 3],
    /// Node emissive (flash) color.
    pub node_emissive: [f32; 3],
    /// Power line color.
    pub line: [f32; 3],
    /// Particle color.
    pub particle: [f32; 3],
    /// Star color.
    pub star: [f32; 3],
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            background: [0.039, 0.039, 0.039],
            tower: [0.533, 0.533, 0.533],
            tower_cap: [0.65, 0.65, 0.65],
            node: [0.0, 1.0, 1.0],
            node_emissive: [0.0, 1.0, 1.0],
            line: [0.0, 1.0, 1.0],
            particle: [0.0, 1.0, 1.0],
            star: [0.9, 0.95, 1.0],
        }
    }
}
