//! Scene assembly: primitive and material arenas plus the BVH over them.

use ember_core::Mesh;
use ember_math::{Color, Interval, Ray};

use crate::bvh::Bvh;
use crate::hittable::{hit_closest, HitRecord, MaterialId, Primitive, PrimitiveId};
use crate::material::Material;
use crate::triangle::Triangle;

/// Default background: a pale sky blue.
const DEFAULT_BACKGROUND: Color = Color::new(0.8, 0.9, 0.99);

/// A fully built, read-only scene.
#[derive(Debug, Clone)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    bvh: Bvh,
    /// Primitives with infinite extent, tested after the BVH
    unbounded: Vec<PrimitiveId>,
    background: Color,
}

impl Scene {
    /// Closest hit inside `ray_t` over the BVH and every unbounded primitive.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let bvh_hit = self.bvh.hit(&self.primitives, ray, ray_t);
        let window = bvh_hit.map_or(ray_t, |h| ray_t.with_max(h.t));

        let unbounded = self.unbounded.iter().map(|id| &self.primitives[id.index()]);
        hit_closest(unbounded, ray, window).or(bvh_hit)
    }

    /// Closest hit by testing every primitive in turn. Slow; used to check
    /// the BVH.
    pub fn hit_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        hit_closest(&self.primitives, ray, ray_t)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.index())
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Color returned for rays that escape the scene.
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Collects primitives and materials, then builds a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    background: Color,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            materials: Vec::new(),
            background: DEFAULT_BACKGROUND,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::new(self.materials.len() - 1)
    }

    pub fn add(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        self.primitives.push(primitive.into());
        PrimitiveId::new(self.primitives.len() - 1)
    }

    /// Add every valid face of `mesh` as a triangle.
    ///
    /// With `smooth` set, triangles interpolate the mesh's vertex normals,
    /// computing them first if the mesh has none. Faces with zero area are
    /// skipped.
    pub fn add_mesh(&mut self, mut mesh: Mesh, material: MaterialId, smooth: bool) -> Vec<PrimitiveId> {
        if smooth {
            mesh.ensure_normals();
        }

        let mut ids = Vec::with_capacity(mesh.triangle_count());
        for [i0, i1, i2] in mesh.faces() {
            let (a, b, c) = (mesh.positions[i0], mesh.positions[i1], mesh.positions[i2]);
            if (b - a).cross(c - a).length_squared() == 0.0 {
                log::debug!("Skipping degenerate mesh face [{}, {}, {}]", i0, i1, i2);
                continue;
            }

            let mut triangle = Triangle::new(a, b, c, material);
            if let (true, Some(normals)) = (smooth, &mesh.normals) {
                triangle = triangle.with_vertex_normals(normals[i0], normals[i1], normals[i2]);
            }
            ids.push(self.add(triangle));
        }

        log::debug!(
            "Added mesh: {} vertices, {} of {} triangles",
            mesh.vertex_count(),
            ids.len(),
            mesh.triangle_count()
        );

        ids
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Build the BVH over bounded primitives and freeze the scene.
    pub fn build(self) -> Scene {
        let material_count = self.materials.len();
        for (index, primitive) in self.primitives.iter().enumerate() {
            if primitive.material().index() >= material_count {
                log::warn!(
                    "Primitive {} references unknown material {}; it will absorb all light",
                    index,
                    primitive.material().index()
                );
            }
        }

        let (bounded, unbounded): (Vec<PrimitiveId>, Vec<PrimitiveId>) = (0..self.primitives.len())
            .map(PrimitiveId::new)
            .partition(|id| self.primitives[id.index()].is_bounded());

        let bvh = Bvh::build(&self.primitives, bounded);

        log::info!(
            "Built scene: {} primitives ({} unbounded), {} materials, {} BVH nodes",
            self.primitives.len(),
            unbounded.len(),
            material_count,
            bvh.node_count()
        );
        if bvh.fallback_splits() > 0 {
            log::debug!("BVH used {} count-based fallback splits", bvh.fallback_splits());
        }

        Scene {
            primitives: self.primitives,
            materials: self.materials,
            bvh,
            unbounded,
            background: self.background,
        }
    }
}
