//! Visual object kinds. Each kind is a fixed struct carrying exactly the
//! state its animation needs.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use glam::Vec3;

use super::resources::Renderable;

/// Tag identifying the kind of a visual object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Static support tower.
    Tower,
    /// Pulsing node on top of a tower.
    Node,
    /// Power line between two neighbouring towers.
    Line,
    /// Electricity particle travelling along the lines.
    Particle,
    /// Background star.
    Star,
}

/// Static support tower. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Tower {
    /// Tower centre in world space.
    pub position: Vec3,
    /// Geometry and materials (side, top cap, bottom cap).
    pub renderable: Renderable,
}

/// A node's self-illumination, shared with pending flash-reset timers.
///
/// Timers only ever hold a [`Weak`] handle (see [`Node::emissive_handle`]),
/// so dropping the scene invalidates them.
#[derive(Debug)]
pub struct Emissive {
    intensity: Cell<f32>,
    steady: f32,
}

impl Emissive {
    /// Emissive state resting at `steady` intensity.
    #[must_use]
    pub fn new(steady: f32) -> Self {
        Self {
            intensity: Cell::new(steady),
            steady,
        }
    }

    /// Current intensity.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity.get()
    }

    /// Intensity the node returns to after a flash.
    #[must_use]
    pub fn steady(&self) -> f32 {
        self.steady
    }

    /// Start a flash at the given intensity.
    pub fn flash(&self, intensity: f32) {
        self.intensity.set(intensity);
    }

    /// Return to the steady intensity.
    pub fn reset(&self) {
        self.intensity.set(self.steady);
    }
}

/// Glowing node above a tower; pulses in scale and occasionally flashes.
#[derive(Debug)]
pub struct Node {
    /// Node centre in world space.
    pub position: Vec3,
    /// Pulse phase offset in `[0, 2π)`, fixed at creation.
    pub pulse_phase: f32,
    /// Current uniform scale.
    pub scale: f32,
    /// Geometry and material.
    pub renderable: Renderable,
    emissive: Rc<Emissive>,
}

impl Node {
    /// Node at `position` with the given pulse phase and steady glow.
    #[must_use]
    pub fn new(
        position: Vec3,
        pulse_phase: f32,
        steady_emissive: f32,
        renderable: Renderable,
    ) -> Self {
        Self {
            position,
            pulse_phase,
            scale: 1.0,
            renderable,
            emissive: Rc::new(Emissive::new(steady_emissive)),
        }
    }

    /// The node's emissive state.
    #[must_use]
    pub fn emissive(&self) -> &Emissive {
        &self.emissive
    }

    /// A non-owning handle to the emissive state, for delayed callbacks.
    #[must_use]
    pub fn emissive_handle(&self) -> Weak<Emissive> {
        Rc::downgrade(&self.emissive)
    }
}

/// Axis a power line runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    /// Parallel to world X.
    X,
    /// Parallel to world Z.
    Z,
}

impl LineAxis {
    /// Unit vector along the axis.
    #[must_use]
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Z => Vec3::Z,
        }
    }
}

/// Power line between two lattice-adjacent nodes. Immutable.
#[derive(Debug, Clone)]
pub struct Line {
    /// Endpoint with the smaller coordinate along [`Line::axis`].
    pub start: Vec3,
    /// Endpoint with the larger coordinate along [`Line::axis`].
    pub end: Vec3,
    /// Axis the line runs along.
    pub axis: LineAxis,
    /// Geometry (the segment itself) and material.
    pub renderable: Renderable,
}

impl Line {
    /// Point at parameter `t` in `[0, 1]` from start to end.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t)
    }
}

/// Electricity particle.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current position.
    pub position: Vec3,
    /// Per-frame displacement.
    pub direction: Vec3,
    /// Speed along a line after a reset, fixed at creation.
    pub speed: f32,
    /// Geometry and material.
    pub renderable: Renderable,
}

/// Background star on a spherical shell around the origin.
#[derive(Debug, Clone)]
pub struct Star {
    /// Position on the shell, fixed at creation.
    pub position: Vec3,
    /// Billboard size, fixed at creation.
    pub scale: f32,
    /// Angular speed of the twinkle, fixed at creation.
    pub twinkle_speed: f32,
    /// Current opacity in `[0, 1]`.
    pub opacity: f32,
    /// Geometry and material.
    pub renderable: Renderable,
}
