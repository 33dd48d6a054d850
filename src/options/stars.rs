use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Background starfield parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Stars", inline)]
#[serde(default)]
pub struct StarOptions {
    /// Number of stars; zero disables the starfield.
    #[schemars(title = "Count", range(min = 0, max = 2000))]
    pub count: usize,
    /// Inner radius of the spherical shell stars are placed on.
    #[schemars(skip)]
    pub inner_radius: f32,
    /// Outer radius (exclusive) of the shell.
    #[schemars(skip)]
    pub outer_radius: f32,
    /// Smallest star billboard size.
    #[schemars(skip)]
    pub min_scale: f32,
    /// Largest star billboard size (exclusive).
    #[schemars(skip)]
    pub max_scale: f32,
    /// Slowest twinkle angular speed (radians per second).
    #[schemars(title = "Min Twinkle", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub min_twinkle: f32,
    /// Fastest twinkle angular speed (exclusive).
    #[schemars(title = "Max Twinkle", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub max_twinkle: f32,
}

impl Default for StarOptions {
    fn default() -> Self {
        Self {
            count: 0,
            inner_radius: 60.0,
            outer_radius: 100.0,
            min_scale: 0.15,
            max_scale: 0.45,
            min_twinkle: 0.5,
            max_twinkle: 2.0,
        }
    }
}
