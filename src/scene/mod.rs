//! The procedural power-grid scene: typed per-kind object collections plus
//! the descriptors of the geometry and materials they draw with.
//!
//! Object kinds never change after creation, so each kind lives in its own
//! collection and per-frame code iterates them directly instead of
//! dispatching on a tag.

mod builder;
mod objects;
mod resources;

use glam::Vec3;

pub use builder::SceneBuilder;
pub use objects::{
    Emissive, Line, LineAxis, Node, ObjectKind, Particle, Star, Tower,
};
pub use resources::{
    GeometryDesc, GeometryId, MaterialDesc, MaterialId, MaterialSet,
    Renderable, ResourceTable, Shading,
};

// ---------------------------------------------------------------------------
// Particle bounds
// ---------------------------------------------------------------------------

/// Box particles must stay inside; leaving it triggers a reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBounds {
    /// Half-extent on X and Z.
    pub extent: f32,
    /// Centre of the band on Y.
    pub node_height: f32,
    /// Half-thickness of the band on Y.
    pub band_half_height: f32,
}

impl ParticleBounds {
    /// Whether `position` lies inside the box (boundary inclusive).
    #[must_use]
    pub fn contains(&self, position: Vec3) -> bool {
        position.x.abs() <= self.extent
            && (position.y - self.node_height).abs() <= self.band_half_height
            && position.z.abs() <= self.extent
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Every visual object of one mounted visualization.
///
/// Produced once by [`SceneBuilder`] and dropped as a whole at teardown;
/// objects are never added or removed individually.
#[derive(Debug)]
pub struct Scene {
    towers: Vec<Tower>,
    nodes: Vec<Node>,
    lines: Vec<Line>,
    particles: Vec<Particle>,
    stars: Vec<Star>,
    resources: ResourceTable,
    bounds: ParticleBounds,
    background: [f32; 3],
}

impl Scene {
    /// Support towers.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Nodes, one per tower and in the same order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable nodes, for the animator.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Power lines.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Stars.
    #[must_use]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Mutable stars, for the animator.
    pub fn stars_mut(&mut self) -> &mut [Star] {
        &mut self.stars
    }

    /// Particles together with the read-only data a reset needs.
    pub fn particles_mut(
        &mut self,
    ) -> (&mut [Particle], &[Line], ParticleBounds) {
        (&mut self.particles, &self.lines, self.bounds)
    }

    /// Geometry and material descriptors.
    #[must_use]
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Box the particles are kept inside.
    #[must_use]
    pub fn bounds(&self) -> ParticleBounds {
        self.bounds
    }

    /// Clear color behind the scene.
    #[must_use]
    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    /// Total number of visual objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.towers.len()
            + self.nodes.len()
            + self.lines.len()
            + self.particles.len()
            + self.stars.len()
    }

    /// Visit every visual object's tag and renderable, kind by kind.
    pub fn renderables(
        &self,
    ) -> impl Iterator<Item = (ObjectKind, &Renderable)> + '_ {
        let towers =
            self.towers.iter().map(|t| (ObjectKind::Tower, &t.renderable));
        let nodes = self.nodes.iter().map(|n| (ObjectKind::Node, &n.renderable));
        let lines = self.lines.iter().map(|l| (ObjectKind::Line, &l.renderable));
        let particles = self
            .particles
            .iter()
            .map(|p| (ObjectKind::Particle, &p.renderable));
        let stars = self.stars.iter().map(|s| (ObjectKind::Star, &s.renderable));
        towers.chain(nodes).chain(lines).chain(particles).chain(stars)
    }
}
