//! Bounding Volume Hierarchy (BVH) acceleration structure for meshes.
//!
//! A 4-wide tree flattened into a node array in pre-order (root at index 0).
//! Each node stores the boxes of up to four children inline, so a traversal
//! step tests all children of one node without touching their nodes.

use crate::{HitPoint, Triangle};
use lux_math::{Aabb, Interval, Ray, Vec3};

/// Children per node.
pub const BVH_WIDTH: usize = 4;

/// Leaf boxes are padded by this much so axis-aligned triangles keep a volume.
const LEAF_PADDING: f32 = 1e-4;

/// Traversal stack depth. Near-equal 4-way splits keep the tree depth at
/// `ceil(log4(n))`, and at most three siblings per level wait on the stack.
const MAX_STACK: usize = 64;

/// Flattened BVH node with up to [`BVH_WIDTH`] children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    /// Number of used child slots (1..=4)
    pub child_count: u8,
    /// Per-child box minimum corners
    pub child_min: [Vec3; BVH_WIDTH],
    /// Per-child box maximum corners
    pub child_max: [Vec3; BVH_WIDTH],
    /// Triangle index for leaf slots, node index otherwise
    pub child_index: [u32; BVH_WIDTH],
    pub child_is_leaf: [bool; BVH_WIDTH],
}

impl BvhNode {
    const EMPTY: BvhNode = BvhNode {
        child_count: 0,
        child_min: [Vec3::ZERO; BVH_WIDTH],
        child_max: [Vec3::ZERO; BVH_WIDTH],
        child_index: [0; BVH_WIDTH],
        child_is_leaf: [false; BVH_WIDTH],
    };

    /// Bounding box of child slot `i`.
    #[inline]
    pub fn child_bounds(&self, i: usize) -> Aabb {
        Aabb::new(self.child_min[i], self.child_max[i])
    }
}

/// A triangle reference used during construction.
#[derive(Debug, Clone, Copy)]
struct BuildLeaf {
    triangle: u32,
    bounds: Aabb,
}

/// BVH over a triangle list. Owns only nodes; triangles stay in the mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build the hierarchy for `triangles`. An empty slice yields an empty BVH.
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut leaves: Vec<BuildLeaf> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| BuildLeaf {
                triangle: i as u32,
                bounds: tri.bounds().padded(LEAF_PADDING),
            })
            .collect();

        let mut nodes = Vec::new();
        if !leaves.is_empty() {
            Self::build_node(&mut nodes, &mut leaves);
        }
        Self { nodes }
    }

    /// Recursive construction.
    ///
    /// Sorts leaves along the longest axis of their bounds by max corner and
    /// partitions them into up to four near-equal groups. Returns the node
    /// index, which is reserved before the children so indices are pre-order.
    fn build_node(nodes: &mut Vec<BvhNode>, leaves: &mut [BuildLeaf]) -> u32 {
        let bounds = leaves
            .iter()
            .fold(Aabb::EMPTY, |acc, leaf| acc.encapsulate(&leaf.bounds));
        let axis = bounds.longest_axis();

        leaves.sort_unstable_by(|a, b| a.bounds.max[axis].total_cmp(&b.bounds.max[axis]));

        let node_index = nodes.len();
        nodes.push(BvhNode::EMPTY);

        let n = leaves.len();
        let groups = n.min(BVH_WIDTH);
        let mut node = BvhNode::EMPTY;
        node.child_count = groups as u8;

        for g in 0..groups {
            let group = &mut leaves[g * n / groups..(g + 1) * n / groups];
            let group_bounds = group
                .iter()
                .fold(Aabb::EMPTY, |acc, leaf| acc.encapsulate(&leaf.bounds));

            node.child_min[g] = group_bounds.min;
            node.child_max[g] = group_bounds.max;

            if group.len() == 1 {
                node.child_is_leaf[g] = true;
                node.child_index[g] = group[0].triangle;
            } else {
                node.child_index[g] = Self::build_node(nodes, group);
            }
        }

        nodes[node_index] = node;
        node_index as u32
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounds of everything under the root.
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |root| {
            (0..root.child_count as usize).fold(Aabb::EMPTY, |acc, i| acc.encapsulate(&root.child_bounds(i)))
        })
    }

    /// Number of node levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], index: usize) -> usize {
            let node = &nodes[index];
            1 + (0..node.child_count as usize)
                .filter(|&i| !node.child_is_leaf[i])
                .map(|i| walk(nodes, node.child_index[i] as usize))
                .max()
                .unwrap_or(0)
        }

        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Nearest hit with `t` strictly inside `range`.
    ///
    /// Iterative traversal with an explicit stack; nearer children are popped
    /// first and children entered beyond the current best hit are skipped.
    pub fn intersect(&self, triangles: &[Triangle], ray: &Ray, range: Interval) -> Option<HitPoint> {
        if self.nodes.is_empty() {
            return None;
        }

        let inv = ray.inv_dir();
        let mut best: Option<HitPoint> = None;
        let mut best_t = range.max;

        let mut stack = [0u32; MAX_STACK];
        let mut top = 1;

        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];

            let mut pending = [(0.0f32, 0u32); BVH_WIDTH];
            let mut pending_count = 0;

            for i in 0..node.child_count as usize {
                let Some(slab) = node.child_bounds(i).intersect_fast(&inv) else {
                    continue;
                };
                let entry = if slab.front_hit { slab.t } else { 0.0 };
                if entry >= best_t {
                    continue;
                }

                if node.child_is_leaf[i] {
                    let triangle = &triangles[node.child_index[i] as usize];
                    if let Some(hit) = triangle.intersect(ray) {
                        if range.with_max(best_t).surrounds(hit.t) {
                            best_t = hit.t;
                            best = Some(hit);
                        }
                    }
                } else {
                    pending[pending_count] = (entry, node.child_index[i]);
                    pending_count += 1;
                }
            }

            // Farthest first, so the nearest child is popped next.
            let pending = &mut pending[..pending_count];
            pending.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
            for &(_, child) in pending.iter() {
                debug_assert!(top < MAX_STACK, "BVH traversal stack overflow");
                stack[top] = child;
                top += 1;
            }
        }

        best
    }
}
