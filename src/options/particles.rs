use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Electricity particle parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Particles", inline)]
#[serde(default)]
pub struct ParticleOptions {
    /// Number of particles in the scene.
    #[schemars(title = "Count", range(min = 0, max = 500))]
    pub count: usize,
    /// Lower bound of the per-particle speed band (units per frame).
    #[schemars(title = "Min Speed", range(min = 0.005, max = 0.2), extend("step" = 0.005))]
    pub min_speed: f32,
    /// Upper bound (exclusive) of the per-particle speed band.
    #[schemars(title = "Max Speed", range(min = 0.005, max = 0.2), extend("step" = 0.005))]
    pub max_speed: f32,
    /// Spread of the initial random direction on each axis.
    #[schemars(skip)]
    pub initial_drift: f32,
    /// Spread of the height jitter given to a particle reset onto a line.
    #[schemars(skip)]
    pub height_jitter: f32,
    /// Particle sphere radius.
    #[schemars(skip)]
    pub radius: f32,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            count: 100,
            min_speed: 0.02,
            max_speed: 0.05,
            initial_drift: 0.1,
            height_jitter: 0.01,
            radius: 0.05,
        }
    }
}
