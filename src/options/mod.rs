//! Centralized visualization options with TOML preset support.
//!
//! Every tweakable setting (lattice layout, particles, starfield, camera,
//! lighting, colors, post-processing) is consolidated here. Options
//! serialize to/from TOML so view presets can live next to the binary.

mod camera;
mod colors;
mod grid;
mod lighting;
mod particles;
mod post_processing;
mod stars;

use std::path::Path;

pub use camera::CameraOptions;
pub use colors::ColorOptions;
pub use grid::GridOptions;
pub use lighting::LightingOptions;
pub use particles::ParticleOptions;
pub use post_processing::PostProcessingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use stars::StarOptions;

use crate::error::GridError;

/// Largest accepted number of towers along one lattice axis.
pub const MAX_LATTICE_SIZE: usize = 256;
/// Largest accepted electricity particle count.
pub const MAX_PARTICLES: usize = 10_000;
/// Largest accepted star count.
pub const MAX_STARS: usize = 20_000;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[stars]`) work correctly.
///
/// The default is the classic landing-page look; see [`Options::enhanced`]
/// for the starfield + bloom variant.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Lattice layout and node flashing.
    pub grid: GridOptions,
    /// Electricity particles.
    pub particles: ParticleOptions,
    /// Background starfield.
    pub stars: StarOptions,
    /// Camera projection and orbit control.
    pub camera: CameraOptions,
    /// Ambient and directional light.
    pub lighting: LightingOptions,
    /// Color palette.
    #[schemars(skip)]
    pub colors: ColorOptions,
    /// Bloom and tone mapping.
    pub post_processing: PostProcessingOptions,
    /// Seed for the scene and animation RNG. `None` seeds from the OS.
    #[schemars(skip)]
    pub seed: Option<u64>,
}

impl Options {
    /// The plain landing-page variant: no stars, no bloom, fixed camera.
    #[must_use]
    pub fn classic() -> Self {
        Self::default()
    }

    /// Starfield, bloom and a slowly auto-rotating camera held above the
    /// grid plane.
    #[must_use]
    pub fn enhanced() -> Self {
        let mut opts = Self::default();
        opts.grid.flash_probability = 0.002;
        opts.grid.flash_duration_ms = 200;
        opts.grid.steady_emissive = 0.5;
        opts.particles.count = 200;
        opts.stars.count = 500;
        opts.camera.distance = 18.0;
        opts.camera.polar_angle = 65.0;
        opts.camera.auto_rotate = true;
        opts.camera.min_polar_angle = 35.0;
        opts.camera.max_polar_angle = 85.0;
        opts.post_processing.bloom_enabled = true;
        opts
    }

    /// Look up a built-in preset by name (`"classic"` or `"enhanced"`).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "enhanced" => Some(Self::enhanced()),
            _ => None,
        }
    }

    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Check the options describe a buildable scene.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidOptions`] naming the first bad field.
    /// Non-finite floats are rejected before any range check.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), GridError> {
        let invalid = |msg: &str| Err(GridError::InvalidOptions(msg.to_owned()));
        if let Some((name, _)) =
            self.scalar_fields().into_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(GridError::InvalidOptions(format!(
                "{name} must be finite"
            )));
        }
        let grid = &self.grid;
        if !(grid.step > 0.0) {
            return invalid("grid.step must be positive");
        }
        if !(grid.extent >= 0.0) {
            return invalid("grid.extent must not be negative");
        }
        if !(grid.band_half_height > 0.0) {
            return invalid("grid.band_half_height must be positive");
        }
        if !(0.0..=1.0).contains(&grid.flash_probability) {
            return invalid("grid.flash_probability must be within [0, 1]");
        }
        if grid.lattice_size() > MAX_LATTICE_SIZE {
            return Err(GridError::InvalidOptions(format!(
                "grid.extent / grid.step gives more than {MAX_LATTICE_SIZE} towers per side"
            )));
        }
        if self.particles.count > MAX_PARTICLES {
            return Err(GridError::InvalidOptions(format!(
                "particles.count must not exceed {MAX_PARTICLES}"
            )));
        }
        if self.stars.count > MAX_STARS {
            return Err(GridError::InvalidOptions(format!(
                "stars.count must not exceed {MAX_STARS}"
            )));
        }
        let particles = &self.particles;
        if !(particles.min_speed > 0.0 && particles.min_speed <= particles.max_speed)
        {
            return invalid("particles speed band must satisfy 0 < min <= max");
        }
        let stars = &self.stars;
        if !(stars.inner_radius > 0.0 && stars.inner_radius <= stars.outer_radius)
        {
            return invalid("stars radius band must satisfy 0 < inner <= outer");
        }
        if !(stars.min_scale <= stars.max_scale
            && stars.min_twinkle <= stars.max_twinkle)
        {
            return invalid("stars scale and twinkle bands must satisfy min <= max");
        }
        let camera = &self.camera;
        if !(camera.znear > 0.0 && camera.znear < camera.zfar) {
            return invalid("camera planes must satisfy 0 < znear < zfar");
        }
        if !(camera.fovy > 0.0 && camera.fovy < 180.0) {
            return invalid("camera.fovy must be within (0, 180)");
        }
        if !(camera.min_polar_angle >= 0.0
            && camera.min_polar_angle <= camera.max_polar_angle
            && camera.max_polar_angle <= 180.0)
        {
            return invalid("camera polar range must satisfy 0 <= min <= max <= 180");
        }
        Ok(())
    }

    fn scalar_fields(&self) -> Vec<(&'static str, f32)> {
        let (g, p, s, c, l, e) = (
            &self.grid,
            &self.particles,
            &self.stars,
            &self.camera,
            &self.lighting,
            &self.post_processing,
        );
        let mut fields = vec![
            ("grid.extent", g.extent),
            ("grid.step", g.step),
            ("grid.node_height", g.node_height),
            ("grid.band_half_height", g.band_half_height),
            ("grid.tower_height", g.tower_height),
            ("grid.tower_radius", g.tower_radius),
            ("grid.node_radius", g.node_radius),
            ("grid.flash_probability", g.flash_probability),
            ("grid.flash_intensity", g.flash_intensity),
            ("grid.steady_emissive", g.steady_emissive),
            ("particles.min_speed", p.min_speed),
            ("particles.max_speed", p.max_speed),
            ("particles.initial_drift", p.initial_drift),
            ("particles.height_jitter", p.height_jitter),
            ("particles.radius", p.radius),
            ("stars.inner_radius", s.inner_radius),
            ("stars.outer_radius", s.outer_radius),
            ("stars.min_scale", s.min_scale),
            ("stars.max_scale", s.max_scale),
            ("stars.min_twinkle", s.min_twinkle),
            ("stars.max_twinkle", s.max_twinkle),
            ("camera.fovy", c.fovy),
            ("camera.znear", c.znear),
            ("camera.zfar", c.zfar),
            ("camera.distance", c.distance),
            ("camera.polar_angle", c.polar_angle),
            ("camera.rotate_speed", c.rotate_speed),
            ("camera.damping_factor", c.damping_factor),
            ("camera.auto_rotate_speed", c.auto_rotate_speed),
            ("camera.min_polar_angle", c.min_polar_angle),
            ("camera.max_polar_angle", c.max_polar_angle),
            ("lighting.ambient_intensity", l.ambient_intensity),
            ("lighting.key_intensity", l.key_intensity),
            ("lighting.shininess", l.shininess),
            ("post_processing.bloom_strength", e.bloom_strength),
            ("post_processing.bloom_radius", e.bloom_radius),
            ("post_processing.bloom_threshold", e.bloom_threshold),
            ("post_processing.exposure", e.exposure),
        ];
        for (name, v) in [
            ("lighting.ambient_color", l.ambient_color),
            ("lighting.key_direction", l.key_direction),
            ("lighting.key_color", l.key_color),
        ] {
            fields.extend(v.into_iter().map(|x| (name, x)));
        }
        fields
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Io`] if the file cannot be read and
    /// [`GridError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, GridError> {
        let content = std::fs::read_to_string(path).map_err(GridError::Io)?;
        toml::from_str(&content)
            .map_err(|e| GridError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OptionsParse`] if serialization fails and
    /// [`GridError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), GridError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(GridError::Io)?;
        }
        std::fs::write(path, content).map_err(GridError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::enhanced();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[stars]
count = 42
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.stars.count, 42);
        // Everything else should be default
        assert_eq!(opts.stars.inner_radius, 60.0);
        assert_eq!(opts.grid.extent, 10.0);
        assert_eq!(opts.camera.fovy, 75.0);
        assert!(!opts.post_processing.bloom_enabled);
    }

    #[test]
    fn presets_differ_where_expected() {
        let classic = Options::classic();
        let enhanced = Options::enhanced();
        assert_eq!(classic.stars.count, 0);
        assert_eq!(enhanced.stars.count, 500);
        assert!(enhanced.post_processing.bloom_enabled);
        assert!(enhanced.camera.auto_rotate);
        assert_eq!(classic.grid, GridOptions::default());
        assert_eq!(Options::preset("Enhanced"), Some(enhanced));
        assert_eq!(Options::preset("sparkly"), None);
    }

    #[test]
    fn presets_validate() {
        assert!(Options::classic().validate().is_ok());
        assert!(Options::enhanced().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut opts = Options::default();
        opts.grid.step = 0.0;
        assert!(matches!(opts.validate(), Err(GridError::InvalidOptions(_))));

        let mut opts = Options::default();
        opts.particles.min_speed = 0.1;
        opts.particles.max_speed = 0.05;
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.camera.znear = 2000.0;
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.grid.extent = f32::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_fields() {
        let opts: Options = toml::from_str("[grid]\nextent = inf\n").unwrap();
        let Err(GridError::InvalidOptions(msg)) = opts.validate() else {
            panic!("infinite extent accepted");
        };
        assert!(msg.contains("grid.extent"), "{msg}");

        let mut opts = Options::default();
        opts.camera.distance = f32::INFINITY;
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.lighting.key_direction = [0.0, f32::NEG_INFINITY, 0.0];
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.post_processing.exposure = f32::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn validate_caps_scene_size() {
        let mut opts = Options::default();
        opts.grid.extent = 1.0e6;
        opts.grid.step = 1.0e-3;
        assert!(matches!(opts.validate(), Err(GridError::InvalidOptions(_))));

        let mut opts = Options::default();
        opts.grid.step = 1.0;
        opts.grid.extent = (MAX_LATTICE_SIZE - 1) as f32 / 2.0;
        assert_eq!(opts.grid.lattice_size(), MAX_LATTICE_SIZE);
        assert!(opts.validate().is_ok());
        opts.grid.extent += 0.5;
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.particles.count = MAX_PARTICLES + 1;
        assert!(opts.validate().is_err());

        let mut opts = Options::default();
        opts.stars.count = MAX_STARS + 1;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn lattice_size_saturates_on_runaway_extent() {
        let grid = GridOptions {
            extent: f32::INFINITY,
            ..GridOptions::default()
        };
        assert_eq!(grid.lattice_size(), 1);
        let grid = GridOptions {
            extent: f32::MAX,
            step: f32::MIN_POSITIVE,
            ..GridOptions::default()
        };
        assert_eq!(grid.lattice_size(), usize::MAX);
    }

    #[test]
    fn lattice_coords_cover_extent() {
        let grid = GridOptions::default();
        assert_eq!(grid.lattice_size(), 6);
        assert_eq!(
            grid.lattice_coords(),
            vec![-10.0, -6.0, -2.0, 2.0, 6.0, 10.0]
        );

        let uneven = GridOptions {
            extent: 5.0,
            step: 4.0,
            ..GridOptions::default()
        };
        assert_eq!(uneven.lattice_coords(), vec![-5.0, -1.0, 3.0]);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("grid"));
        assert!(props.contains_key("particles"));
        assert!(props.contains_key("stars"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("post_processing"));

        // Skipped sections should be absent
        assert!(!props.contains_key("colors"));
        assert!(!props.contains_key("seed"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("rotate_speed").is_some());
        assert!(camera.get("znear").is_none());
    }
}
