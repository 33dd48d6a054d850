//! Procedural scene synthesis.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use super::objects::{Line, LineAxis, Node, Particle, Star, Tower};
use super::resources::{
    GeometryDesc, MaterialDesc, MaterialSet, Renderable, ResourceTable,
    Shading,
};
use super::{ParticleBounds, Scene};
use crate::options::Options;

/// Uniform sample in `[min, max)`; returns `min` for an empty band instead
/// of panicking like `random_range`.
fn sample_band<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Centred uniform sample in `[-spread / 2, spread / 2)`.
fn sample_centred<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}

/// Builds the static power-grid layout from [`Options`].
///
/// The only source of variation is the RNG handed to
/// [`build`](Self::build): pulse phases, particle placement and speed, and
/// star placement, size and twinkle.
pub struct SceneBuilder<'a> {
    options: &'a Options,
}

impl<'a> SceneBuilder<'a> {
    /// Builder for the given (validated) options.
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Synthesize the scene.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Scene {
        let grid = &self.options.grid;
        let mut resources = ResourceTable::default();

        let (towers, nodes) = self.build_lattice(&mut resources, rng);
        let lines = self.build_lines(&mut resources);
        let particles = self.build_particles(&mut resources, rng);
        let stars = self.build_stars(&mut resources, rng);

        log::debug!(
            "scene built: {} towers, {} nodes, {} lines, {} particles, {} \
             stars, {} geometries, {} materials",
            towers.len(),
            nodes.len(),
            lines.len(),
            particles.len(),
            stars.len(),
            resources.geometry_count(),
            resources.material_count(),
        );

        Scene {
            towers,
            nodes,
            lines,
            particles,
            stars,
            resources,
            bounds: ParticleBounds {
                extent: grid.extent,
                node_height: grid.node_height,
                band_half_height: grid.band_half_height,
            },
            background: self.options.colors.background,
        }
    }

    /// One tower per lattice point and one node above each.
    fn build_lattice<R: Rng + ?Sized>(
        &self,
        resources: &mut ResourceTable,
        rng: &mut R,
    ) -> (Vec<Tower>, Vec<Node>) {
        let grid = &self.options.grid;
        let colors = &self.options.colors;

        let tower_geometry = resources.add_geometry(GeometryDesc::Cylinder {
            radius: grid.tower_radius,
            height: grid.tower_height,
            segments: 8,
        });
        let tower_side = resources.add_material(MaterialDesc {
            label: "Tower Side",
            color: colors.tower,
            emissive: [0.0; 3],
            shading: Shading::Phong,
            transparent: false,
        });
        let tower_cap = resources.add_material(MaterialDesc {
            label: "Tower Cap",
            color: colors.tower_cap,
            emissive: [0.0; 3],
            shading: Shading::Phong,
            transparent: false,
        });
        let tower_renderable = Renderable {
            geometry: tower_geometry,
            materials: MaterialSet::Multiple(vec![
                tower_side, tower_cap, tower_cap,
            ]),
        };

        let node_geometry = resources.add_geometry(GeometryDesc::Sphere {
            radius: grid.node_radius,
            width_segments: 16,
            height_segments: 16,
        });
        let node_material = resources.add_material(MaterialDesc {
            label: "Node",
            color: colors.node,
            emissive: colors.node_emissive,
            shading: Shading::Phong,
            transparent: false,
        });
        let node_renderable = Renderable {
            geometry: node_geometry,
            materials: MaterialSet::Single(node_material),
        };

        let coords = grid.lattice_coords();
        let count = coords.len() * coords.len();
        let mut towers = Vec::with_capacity(count);
        let mut nodes = Vec::with_capacity(count);
        for &x in &coords {
            for &z in &coords {
                towers.push(Tower {
                    position: Vec3::new(x, 0.0, z),
                    renderable: tower_renderable.clone(),
                });
                nodes.push(Node::new(
                    Vec3::new(x, grid.node_height, z),
                    rng.random::<f32>() * TAU,
                    grid.steady_emissive,
                    node_renderable.clone(),
                ));
            }
        }
        (towers, nodes)
    }

    /// Lines between axis-aligned lattice neighbours, each with its own
    /// segment geometry.
    fn build_lines(&self, resources: &mut ResourceTable) -> Vec<Line> {
        let grid = &self.options.grid;
        let coords = grid.lattice_coords();
        let n = coords.len();
        let y = grid.node_height;

        let material = resources.add_material(MaterialDesc {
            label: "Power Line",
            color: self.options.colors.line,
            emissive: [0.0; 3],
            shading: Shading::Basic,
            transparent: false,
        });

        let mut lines = Vec::with_capacity(2 * n.saturating_sub(1) * n);
        let mut push_line =
            |start: Vec3, end: Vec3, axis: LineAxis, lines: &mut Vec<Line>| {
                let geometry =
                    resources.add_geometry(GeometryDesc::Segment { start, end });
                lines.push(Line {
                    start,
                    end,
                    axis,
                    renderable: Renderable {
                        geometry,
                        materials: MaterialSet::Single(material),
                    },
                });
            };

        for i in 0..n {
            for j in 0..n {
                let here = Vec3::new(coords[i], y, coords[j]);
                if i + 1 < n {
                    let east = Vec3::new(coords[i + 1], y, coords[j]);
                    push_line(here, east, LineAxis::X, &mut lines);
                }
                if j + 1 < n {
                    let south = Vec3::new(coords[i], y, coords[j + 1]);
                    push_line(here, south, LineAxis::Z, &mut lines);
                }
            }
        }
        lines
    }

    fn build_particles<R: Rng + ?Sized>(
        &self,
        resources: &mut ResourceTable,
        rng: &mut R,
    ) -> Vec<Particle> {
        let opts = &self.options.particles;
        if opts.count == 0 {
            return Vec::new();
        }
        let grid = &self.options.grid;

        let renderable = Renderable {
            geometry: resources.add_geometry(GeometryDesc::Sphere {
                radius: opts.radius,
                width_segments: 8,
                height_segments: 8,
            }),
            materials: MaterialSet::Single(resources.add_material(
                MaterialDesc {
                    label: "Particle",
                    color: self.options.colors.particle,
                    emissive: [0.0; 3],
                    shading: Shading::Basic,
                    transparent: false,
                },
            )),
        };

        let span = 2.0 * grid.extent;
        (0..opts.count)
            .map(|_| Particle {
                position: Vec3::new(
                    sample_centred(rng, span),
                    grid.node_height + sample_centred(rng, grid.band_half_height),
                    sample_centred(rng, span),
                ),
                speed: sample_band(rng, opts.min_speed, opts.max_speed),
                direction: Vec3::new(
                    sample_centred(rng, opts.initial_drift),
                    sample_centred(rng, opts.initial_drift),
                    sample_centred(rng, opts.initial_drift),
                ),
                renderable: renderable.clone(),
            })
            .collect()
    }

    /// Stars on a spherical shell: θ ∈ [0, 2π), φ ∈ [0, π).
    fn build_stars<R: Rng + ?Sized>(
        &self,
        resources: &mut ResourceTable,
        rng: &mut R,
    ) -> Vec<Star> {
        let opts = &self.options.stars;
        if opts.count == 0 {
            return Vec::new();
        }

        let renderable = Renderable {
            geometry: resources.add_geometry(GeometryDesc::Billboard),
            materials: MaterialSet::Single(resources.add_material(
                MaterialDesc {
                    label: "Star",
                    color: self.options.colors.star,
                    emissive: [0.0; 3],
                    shading: Shading::Basic,
                    transparent: true,
                },
            )),
        };

        (0..opts.count)
            .map(|_| {
                let theta = rng.random::<f32>() * TAU;
                let phi = rng.random::<f32>() * PI;
                let radius =
                    sample_band(rng, opts.inner_radius, opts.outer_radius);
                Star {
                    position: Vec3::new(
                        radius * phi.sin() * theta.cos(),
                        radius * phi.sin() * theta.sin(),
                        radius * phi.cos(),
                    ),
                    scale: sample_band(rng, opts.min_scale, opts.max_scale),
                    twinkle_speed: sample_band(
                        rng,
                        opts.min_twinkle,
                        opts.max_twinkle,
                    ),
                    opacity: 1.0,
                    renderable: renderable.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::scene::ObjectKind;

    fn build(options: &Options, seed: u64) -> Scene {
        SceneBuilder::new(options).build(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn reference_layout_counts() {
        let scene = build(&Options::classic(), 1);
        assert_eq!(scene.towers().len(), 36);
        assert_eq!(scene.nodes().len(), 36);
        assert_eq!(scene.lines().len(), 60);
        assert_eq!(scene.particles().len(), 100);
        assert!(scene.stars().is_empty());

        let enhanced = build(&Options::enhanced(), 1);
        assert_eq!(enhanced.stars().len(), 500);
        assert_eq!(enhanced.particles().len(), 200);
    }

    #[test]
    fn counts_follow_lattice_formula() {
        for (extent, step) in [(10.0, 4.0), (6.0, 2.0), (3.0, 3.0), (0.0, 1.0)]
        {
            let mut options = Options::classic();
            options.grid.extent = extent;
            options.grid.step = step;
            let scene = build(&options, 7);

            let k = (2.0_f32 * extent / step).round() as usize;
            assert_eq!(scene.towers().len(), (k + 1) * (k + 1));
            assert_eq!(scene.nodes().len(), (k + 1) * (k + 1));
            assert_eq!(scene.lines().len(), 2 * k * (k + 1));
        }
    }

    #[test]
    fn nodes_sit_above_towers() {
        let options = Options::classic();
        let scene = build(&options, 2);
        for (tower, node) in scene.towers().iter().zip(scene.nodes()) {
            assert_eq!(tower.position.x, node.position.x);
            assert_eq!(tower.position.z, node.position.z);
            assert_eq!(node.position.y, options.grid.node_height);
            assert!((0.0..TAU).contains(&node.pulse_phase));
            assert_eq!(node.emissive().intensity(), 0.0);
        }
    }

    #[test]
    fn lines_join_axis_neighbours_only() {
        let scene = build(&Options::classic(), 3);
        for line in scene.lines() {
            let delta = line.end - line.start;
            match line.axis {
                LineAxis::X => {
                    assert_eq!(delta.x, 4.0);
                    assert_eq!(delta.z, 0.0);
                }
                LineAxis::Z => {
                    assert_eq!(delta.z, 4.0);
                    assert_eq!(delta.x, 0.0);
                }
            }
            assert_eq!(delta.y, 0.0);
            assert!(line.start.x.abs() <= 10.0 && line.end.z.abs() <= 10.0);
        }
        let along_x =
            scene.lines().iter().filter(|l| l.axis == LineAxis::X).count();
        assert_eq!(along_x, 30);
    }

    #[test]
    fn particles_start_inside_bounds_with_banded_speed() {
        let options = Options::enhanced();
        let scene = build(&options, 4);
        let bounds = scene.bounds();
        for particle in scene.particles() {
            assert!(bounds.contains(particle.position));
            assert!(particle.speed >= options.particles.min_speed);
            assert!(particle.speed < options.particles.max_speed);
            assert!(particle.direction.abs().max_element() <= 0.05);
        }
    }

    #[test]
    fn stars_lie_on_shell() {
        let options = Options::enhanced();
        let scene = build(&options, 5);
        for star in scene.stars() {
            let r = star.position.length();
            assert!(r >= options.stars.inner_radius - 1e-3);
            assert!(r < options.stars.outer_radius + 1e-3);
            assert!(star.scale >= options.stars.min_scale);
            assert!(star.twinkle_speed < options.stars.max_twinkle);
        }
    }

    #[test]
    fn towers_use_one_material_per_cylinder_group() {
        let scene = build(&Options::classic(), 6);
        let tower = &scene.towers()[0];
        assert_eq!(tower.renderable.materials.ids().len(), 3);
        assert!(matches!(
            scene.resources().geometry(tower.renderable.geometry),
            Some(GeometryDesc::Cylinder { .. })
        ));
    }

    #[test]
    fn every_object_is_visited_once() {
        let scene = build(&Options::enhanced(), 8);
        assert_eq!(scene.renderables().count(), scene.object_count());
        let lines = scene
            .renderables()
            .filter(|(kind, _)| *kind == ObjectKind::Line)
            .count();
        assert_eq!(lines, 60);
        // towers + nodes + particles + stars share one geometry per kind
        assert_eq!(scene.resources().geometry_count(), 4 + 60);
    }

    #[test]
    fn same_seed_same_scene() {
        let a = build(&Options::enhanced(), 99);
        let b = build(&Options::enhanced(), 99);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.position, pb.position);
        }
        for (na, nb) in a.nodes().iter().zip(b.nodes()) {
            assert_eq!(na.pulse_phase, nb.pulse_phase);
        }
    }
}
