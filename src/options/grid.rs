use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lattice layout and node flash parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Grid", inline)]
#[serde(default)]
pub struct GridOptions {
    /// Half-extent of the square lattice; towers span `[-extent, extent]`.
    #[schemars(title = "Extent", range(min = 2.0, max = 40.0), extend("step" = 1.0))]
    pub extent: f32,
    /// Distance between neighbouring towers.
    #[schemars(title = "Tower Spacing", range(min = 1.0, max = 10.0), extend("step" = 0.5))]
    pub step: f32,
    /// Height of the nodes (and the lines joining them) above the ground.
    #[schemars(skip)]
    pub node_height: f32,
    /// Vertical half-thickness of the band particles may travel in.
    #[schemars(skip)]
    pub band_half_height: f32,
    /// Tower cylinder height.
    #[schemars(skip)]
    pub tower_height: f32,
    /// Tower cylinder radius.
    #[schemars(skip)]
    pub tower_radius: f32,
    /// Node sphere radius.
    #[schemars(skip)]
    pub node_radius: f32,
    /// Per-node, per-frame probability of an emissive flash.
    #[schemars(title = "Flash Chance", range(min = 0.0, max = 0.01), extend("step" = 0.0005))]
    pub flash_probability: f32,
    /// Emissive intensity while a node is flashing.
    #[schemars(title = "Flash Intensity", range(min = 0.5, max = 5.0), extend("step" = 0.1))]
    pub flash_intensity: f32,
    /// How long a flash lasts before the node returns to its steady glow.
    #[schemars(title = "Flash Duration (ms)", range(min = 50, max = 1000))]
    pub flash_duration_ms: u64,
    /// Emissive intensity of a node that is not flashing.
    #[schemars(skip)]
    pub steady_emissive: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            extent: 10.0,
            step: 4.0,
            node_height: 1.2,
            band_half_height: 0.5,
            tower_height: 2.0,
            tower_radius: 0.1,
            node_radius: 0.3,
            flash_probability: 0.001,
            flash_intensity: 2.0,
            flash_duration_ms: 100,
            steady_emissive: 0.0,
        }
    }
}

impl GridOptions {
    /// Number of lattice columns (and rows) along one axis.
    ///
    /// A small tolerance absorbs float error so that an extent that is an
    /// exact multiple of the step includes its far edge.
    ///
    /// Non-finite or non-positive inputs give a single column; a span too
    /// large for `usize` saturates.
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn lattice_size(&self) -> usize {
        if !(self.step > 0.0 && self.step.is_finite())
            || !(self.extent >= 0.0 && self.extent.is_finite())
        {
            return 1;
        }
        (((2.0 * self.extent) / self.step + 1e-4).floor() as usize)
            .saturating_add(1)
    }

    /// Lattice coordinates along one axis, from `-extent` upward.
    #[must_use]
    pub fn lattice_coords(&self) -> Vec<f32> {
        (0..self.lattice_size())
            .map(|i| -self.extent + i as f32 * self.step)
            .collect()
    }
}
