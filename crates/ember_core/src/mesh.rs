//! Indexed triangle meshes.
//!
//! A mesh is handed to the scene builder, which turns each face into a
//! triangle primitive. How the mesh was read from disk is not this crate's
//! concern.

use ember_math::{Aabb, Vec3};

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Per-vertex normals (optional, see `compute_normals`)
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Aabb::enclosing(positions.iter().copied());
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Compute smooth vertex normals by averaging unit face normals.
    ///
    /// Faces use counter-clockwise winding: `(p1 - p0) x (p2 - p0)` points out.
    /// A vertex touched only by degenerate faces gets +Y.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for [i0, i1, i2] in self.faces() {
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0)
                .cross(self.positions[i2] - p0)
                .normalize_or_zero();

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has normals matching its vertex count.
    pub fn has_normals(&self) -> bool {
        matches!(&self.normals, Some(n) if n.len() == self.positions.len())
    }

    /// Ensure the mesh has normals, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        if !self.has_normals() {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), recomputing",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Valid faces as vertex index triplets.
    ///
    /// Faces referencing a vertex past the end of `positions` are skipped.
    pub fn faces(&self) -> Vec<[usize; 3]> {
        let vertex_count = self.positions.len();
        let mut faces = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let face = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if face.iter().any(|&i| i >= vertex_count) {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    face,
                    vertex_count
                );
                continue;
            }
            faces.push(face);
        }

        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2, 0, 2, 3], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = quad();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = quad();
        mesh.compute_normals();

        assert!(mesh.has_normals());
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((*normal - Vec3::Z).length() < 1e-12);
        }
    }

    #[test]
    fn test_shared_vertex_normal_is_averaged() {
        // Two faces folded 90 degrees along the x axis
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mut mesh = Mesh::new(positions, vec![0, 1, 2, 0, 3, 1], None);
        mesh.compute_normals();

        let normals = mesh.normals.unwrap();
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((normals[0] - expected).length() < 1e-12);
        // Vertex 2 only touches the first face
        assert!((normals[2] - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_invalid_faces_skipped() {
        let mut mesh = quad();
        mesh.indices.extend_from_slice(&[0, 1, 9]);

        assert_eq!(mesh.faces().len(), 2);
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None);

        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_ensure_normals_replaces_mismatched() {
        let mut mesh = quad();
        mesh.normals = Some(vec![Vec3::X]);
        mesh.ensure_normals();

        assert!(mesh.has_normals());
        assert_eq!(mesh.normals.as_ref().unwrap().len(), 4);
    }
}
