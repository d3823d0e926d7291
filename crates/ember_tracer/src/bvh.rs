//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to their children by index. Leaves
//! are ids into the scene's primitive arena, so the tree never owns geometry.

use crate::hittable::{HitRecord, Primitive, PrimitiveId};
use ember_math::{Aabb, Interval, Ray, Vec3};

/// Child slot of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhChild {
    /// Index of another node in [`Bvh::nodes`].
    Node(usize),
    /// A primitive in the scene arena.
    Leaf(PrimitiveId),
}

/// Internal node with exactly two children.
///
/// A node built over a single primitive has both children pointing at the
/// same leaf.
#[derive(Debug, Clone, Copy)]
pub struct BvhNode {
    pub left: BvhChild,
    pub right: BvhChild,
    pub bbox: Aabb,
}

/// Binary BVH over a set of bounded primitives.
///
/// Built once and immutable afterwards. Rebuilding means constructing a new
/// `Bvh`.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: Option<usize>,
    fallback_splits: usize,
}

impl Bvh {
    /// Build a tree over `ids`, which must index into `primitives`.
    ///
    /// Split rule: the axis of largest centroid extent, cut at the midpoint
    /// of that extent. When every centroid lands on one side of the cut, the
    /// ids are sorted along the axis and split by count instead.
    pub fn build(primitives: &[Primitive], ids: Vec<PrimitiveId>) -> Self {
        let mut bvh = Bvh::default();
        if ids.is_empty() {
            return bvh;
        }

        let entries: Vec<Entry> = ids
            .into_iter()
            .map(|id| {
                let bbox = primitives[id.index()].bounding_box();
                Entry {
                    id,
                    bbox,
                    centroid: bbox.centroid(),
                }
            })
            .collect();

        let root = bvh.build_node(entries);
        bvh.root = Some(root);
        bvh
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Number of times construction had to fall back to a count split.
    pub fn fallback_splits(&self) -> usize {
        self.fallback_splits
    }

    /// Box of the whole tree, `Aabb::EMPTY` for an empty tree.
    pub fn bounding_box(&self) -> Aabb {
        self.root.map_or(Aabb::EMPTY, |root| self.nodes[root].bbox)
    }

    /// Every leaf reachable from the root, left to right. An aliased
    /// single-primitive node reports its primitive twice.
    pub fn leaves(&self) -> Vec<PrimitiveId> {
        let mut out = Vec::new();
        let mut stack: Vec<BvhChild> = self.root.map(BvhChild::Node).into_iter().collect();

        while let Some(child) = stack.pop() {
            match child {
                BvhChild::Leaf(id) => out.push(id),
                BvhChild::Node(index) => {
                    let node = &self.nodes[index];
                    stack.push(node.right);
                    stack.push(node.left);
                }
            }
        }

        out
    }

    /// Closest hit inside `ray_t`. `primitives` must be the arena the tree
    /// was built from.
    pub fn hit(&self, primitives: &[Primitive], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let root = self.root?;
        self.hit_node(root, primitives, ray, ray_t)
    }

    fn hit_node(
        &self,
        index: usize,
        primitives: &[Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let left = self.hit_child(node.left, primitives, ray, ray_t);

        // Only check right up to closest hit
        let window = left.map_or(ray_t, |h| ray_t.with_max(h.t));
        let right = self.hit_child(node.right, primitives, ray, window);

        right.or(left)
    }

    fn hit_child(
        &self,
        child: BvhChild,
        primitives: &[Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord> {
        match child {
            BvhChild::Node(index) => self.hit_node(index, primitives, ray, ray_t),
            BvhChild::Leaf(id) => primitives[id.index()].hit(ray, ray_t),
        }
    }

    /// Recursive construction. Children are pushed before their parent, so
    /// the root is the last node in the arena.
    fn build_node(&mut self, mut entries: Vec<Entry>) -> usize {
        let n = entries.len();

        let ((left, left_box), (right, right_box)) = match n {
            1 => {
                let leaf = (BvhChild::Leaf(entries[0].id), entries[0].bbox);
                (leaf, leaf)
            }
            2 => (
                (BvhChild::Leaf(entries[0].id), entries[0].bbox),
                (BvhChild::Leaf(entries[1].id), entries[1].bbox),
            ),
            _ => {
                let (min, max) = centroid_extent(&entries);
                let axis = Aabb { min, max }.longest_axis();
                let median = (max[axis] + min[axis]) / 2.0;

                let (mut left, mut right): (Vec<Entry>, Vec<Entry>) =
                    entries.drain(..).partition(|e| e.centroid[axis] < median);

                if left.is_empty() || right.is_empty() {
                    self.fallback_splits += 1;
                    log::debug!(
                        "BVH midpoint split on axis {} put all {} primitives on one side, splitting by count",
                        axis,
                        n
                    );

                    let mut all = if left.is_empty() { right } else { left };
                    all.sort_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
                    right = all.split_off(n / 2);
                    left = all;
                }

                (self.build_side(left), self.build_side(right))
            }
        };

        self.nodes.push(BvhNode {
            left,
            right,
            bbox: Aabb::surrounding(&left_box, &right_box),
        });
        self.nodes.len() - 1
    }

    /// A side holding one primitive becomes a leaf directly.
    fn build_side(&mut self, entries: Vec<Entry>) -> (BvhChild, Aabb) {
        if let [entry] = entries.as_slice() {
            return (BvhChild::Leaf(entry.id), entry.bbox);
        }
        let index = self.build_node(entries);
        (BvhChild::Node(index), self.nodes[index].bbox)
    }
}

/// Per-primitive data cached during construction.
#[derive(Debug, Clone, Copy)]
struct Entry {
    id: PrimitiveId,
    bbox: Aabb,
    centroid: Vec3,
}

/// Raw min/max of the entries' centroids, without zero-thickness padding.
fn centroid_extent(entries: &[Entry]) -> (Vec3, Vec3) {
    entries.iter().fold(
        (Vec3::splat(f64::INFINITY), Vec3::splat(f64::NEG_INFINITY)),
        |(min, max), e| (min.min(e.centroid), max.max(e.centroid)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{hit_closest, MaterialId};
    use crate::{Sphere, Triangle};

    fn spheres(centers: &[Vec3]) -> Vec<Primitive> {
        centers
            .iter()
            .map(|&c| Primitive::from(Sphere::new(c, 0.5, MaterialId::new(0))))
            .collect()
    }

    fn all_ids(primitives: &[Primitive]) -> Vec<PrimitiveId> {
        (0..primitives.len()).map(PrimitiveId::new).collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&[], Vec::new());
        assert!(bvh.is_empty());
        assert_eq!(bvh.node_count(), 0);
        assert!(bvh.bounding_box().is_empty());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        assert!(bvh.hit(&[], &ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_bvh_single_primitive_aliases_leaf() {
        let prims = spheres(&[Vec3::new(0.0, 0.0, -1.0)]);
        let bvh = Bvh::build(&prims, all_ids(&prims));

        assert_eq!(bvh.node_count(), 1);
        let node = bvh.nodes()[0];
        assert_eq!(node.left, BvhChild::Leaf(PrimitiveId::new(0)));
        assert_eq!(node.left, node.right);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::NEG_Z);
        let rec = bvh.hit(&prims, &ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bvh_two_primitives_direct_children() {
        let prims = spheres(&[Vec3::new(-2.0, 0.0, -3.0), Vec3::new(2.0, 0.0, -3.0)]);
        let bvh = Bvh::build(&prims, all_ids(&prims));

        assert_eq!(bvh.node_count(), 1);
        let node = bvh.nodes()[0];
        assert_eq!(node.left, BvhChild::Leaf(PrimitiveId::new(0)));
        assert_eq!(node.right, BvhChild::Leaf(PrimitiveId::new(1)));
    }

    #[test]
    fn test_bvh_splits_on_widest_centroid_axis() {
        // Centroids spread along y only
        let prims = spheres(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 9.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        ]);
        let bvh = Bvh::build(&prims, all_ids(&prims));
        let root = bvh.nodes()[bvh.root().unwrap()];

        let (BvhChild::Node(l), BvhChild::Node(r)) = (root.left, root.right) else {
            panic!("expected two inner nodes, got {root:?}");
        };
        assert!(bvh.nodes()[l].bbox.max.y < 2.0);
        assert!(bvh.nodes()[r].bbox.min.y > 8.0);
        assert_eq!(bvh.fallback_splits(), 0);
    }

    #[test]
    fn test_bvh_coincident_centroids_terminate() {
        // Every centroid identical: the midpoint cut cannot separate them
        let prims = spheres(&[Vec3::new(1.0, 1.0, 1.0); 9]);
        let bvh = Bvh::build(&prims, all_ids(&prims));

        assert!(bvh.fallback_splits() > 0);
        let mut leaves = bvh.leaves();
        leaves.sort();
        leaves.dedup();
        assert_eq!(leaves, all_ids(&prims));
    }

    #[test]
    fn test_bvh_leaves_cover_every_primitive() {
        let centers: Vec<Vec3> = (0..17)
            .map(|i| Vec3::new(i as f64 * 1.5, (i % 3) as f64, -5.0))
            .collect();
        let prims = spheres(&centers);
        let bvh = Bvh::build(&prims, all_ids(&prims));

        let mut leaves = bvh.leaves();
        leaves.sort();
        assert_eq!(leaves, all_ids(&prims));

        let root_box = bvh.bounding_box();
        for p in &prims {
            assert!(root_box.contains_box(&p.bounding_box()));
        }
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let prims: Vec<Primitive> = (0..10)
            .map(|i| {
                let x = i as f64;
                if i % 2 == 0 {
                    Primitive::from(Sphere::new(Vec3::new(x, 0.0, -5.0), 0.5, MaterialId::new(0)))
                } else {
                    Primitive::from(Triangle::new(
                        Vec3::new(x - 0.5, -0.5, -4.0),
                        Vec3::new(x + 0.5, -0.5, -4.0),
                        Vec3::new(x, 0.5, -4.0),
                        MaterialId::new(1),
                    ))
                }
            })
            .collect();
        let bvh = Bvh::build(&prims, all_ids(&prims));

        for i in 0..40 {
            let x = i as f64 * 0.25 - 0.3;
            let ray = Ray::new_simple(Vec3::new(x, 0.1, 0.0), Vec3::new(0.01, 0.0, -1.0));
            let ray_t = Interval::from_min(0.001);

            let fast = bvh.hit(&prims, &ray, ray_t);
            let slow = hit_closest(&prims, &ray, ray_t);
            assert_eq!(fast.map(|h| h.t), slow.map(|h| h.t), "ray {i}");
        }
    }
}
