//! Geometry and material descriptors referenced by visual objects.
//!
//! The scene never owns GPU handles. It owns a [`ResourceTable`] of
//! descriptors, and every visual object carries a [`Renderable`] naming the
//! geometry and material(s) it draws with. A
//! [`FrameRenderer`](crate::renderer::FrameRenderer) uploads one backing
//! resource per descriptor and releases it again when the objects that use
//! it are torn down.

use glam::Vec3;

/// Index of a geometry descriptor in the scene's [`ResourceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

/// Index of a material descriptor in the scene's [`ResourceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Procedural geometry shapes the scene is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDesc {
    /// Capped cylinder centred on the origin, axis along +Y. Its index
    /// buffer is split into three groups: side, top cap, bottom cap.
    Cylinder {
        /// Cylinder radius.
        radius: f32,
        /// Full height.
        height: f32,
        /// Radial segment count.
        segments: u32,
    },
    /// UV sphere centred on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Segments around the equator.
        width_segments: u32,
        /// Segments from pole to pole.
        height_segments: u32,
    },
    /// A single line segment between two world-space points.
    Segment {
        /// First endpoint.
        start: Vec3,
        /// Second endpoint.
        end: Vec3,
    },
    /// Camera-facing unit quad, scaled per instance.
    Billboard,
}

/// How a material responds to scene lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Unlit flat color.
    Basic,
    /// Ambient + diffuse + specular from the scene lights.
    Phong,
}

/// Surface appearance shared by every object that references it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    /// Human-readable label, used for GPU debug names.
    pub label: &'static str,
    /// Base color.
    pub color: [f32; 3],
    /// Emissive color; scaled by each instance's emissive intensity.
    pub emissive: [f32; 3],
    /// Lighting model.
    pub shading: Shading,
    /// Blend with what is already drawn instead of overwriting it.
    pub transparent: bool,
}

/// The material(s) an object draws with.
///
/// Multi-material objects assign one material per geometry group, in group
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSet {
    /// One material for the whole geometry.
    Single(MaterialId),
    /// One material per geometry group.
    Multiple(Vec<MaterialId>),
}

impl MaterialSet {
    /// Every material in the set, in group order.
    #[must_use]
    pub fn ids(&self) -> &[MaterialId] {
        match self {
            Self::Single(id) => std::slice::from_ref(id),
            Self::Multiple(ids) => ids,
        }
    }
}

/// Geometry + material(s) backing one visual object.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    /// Geometry drawn for the object.
    pub geometry: GeometryId,
    /// Material(s) the geometry is shaded with.
    pub materials: MaterialSet,
}

/// Descriptor storage for one scene. Ids are dense indices.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    geometries: Vec<GeometryDesc>,
    materials: Vec<MaterialDesc>,
}

impl ResourceTable {
    /// Register a geometry descriptor.
    pub fn add_geometry(&mut self, desc: GeometryDesc) -> GeometryId {
        let id = GeometryId(self.geometries.len() as u32);
        self.geometries.push(desc);
        id
    }

    /// Register a material descriptor.
    pub fn add_material(&mut self, desc: MaterialDesc) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(desc);
        id
    }

    /// Look up a geometry descriptor.
    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> Option<&GeometryDesc> {
        self.geometries.get(id.0 as usize)
    }

    /// Look up a material descriptor.
    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&MaterialDesc> {
        self.materials.get(id.0 as usize)
    }

    /// All geometry descriptors with their ids.
    pub fn geometries(
        &self,
    ) -> impl Iterator<Item = (GeometryId, &GeometryDesc)> + '_ {
        self.geometries
            .iter()
            .enumerate()
            .map(|(i, g)| (GeometryId(i as u32), g))
    }

    /// All material descriptors with their ids.
    pub fn materials(
        &self,
    ) -> impl Iterator<Item = (MaterialId, &MaterialDesc)> + '_ {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    /// Number of geometry descriptors.
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Number of material descriptors.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
