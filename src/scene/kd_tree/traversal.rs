use ordered_float::OrderedFloat;

use crate::geometry::{Ray, WorldPoint};
use crate::scene::ObjectStore;

use super::{Hit, KdNode, KdTree, NodeKind};

impl KdTree {
    /// Nearest-hit query along `ray`, front to back.
    ///
    /// Descends toward the subtree containing the ray's entry point first,
    /// deferring the far sibling on an explicit stack, so the first accepted
    /// leaf hit is the globally nearest one.
    pub fn trace(&self, objects: &ObjectStore, ray: &Ray) -> Option<Hit> {
        let (mut near, mut far) = self.root.bounds.intersect(ray)?;

        let mut stack: Vec<(&KdNode, WorldPoint)> = Vec::new();
        let mut current = &self.root;

        loop {
            match &current.kind {
                NodeKind::Leaf { candidates } => {
                    if let Some(hit) = nearest_leaf_hit(current, candidates, objects, ray) {
                        return Some(hit);
                    }

                    // Resume the closest deferred sibling; its interval
                    // starts where the current one ended.
                    let (node, deferred_far) = stack.pop()?;
                    current = node;
                    near = far;
                    far = deferred_far;
                }
                NodeKind::Inner {
                    axis,
                    coordinate,
                    left,
                    right,
                } => {
                    let near_is_left = near[*axis] < *coordinate;
                    let far_is_left = far[*axis] < *coordinate;

                    if near_is_left != far_is_left {
                        let far_child = if far_is_left { left } else { right };
                        stack.push((far_child, far));
                        // Clip the segment to the near side at the split plane.
                        let t = (coordinate - near[*axis]).abs() / (far[*axis] - near[*axis]).abs();
                        far = near + (far - near) * t;
                    }
                    current = if near_is_left { left } else { right };
                }
            }
        }
    }
}

/// Closest accepted candidate hit in a leaf.
///
/// A hit is only accepted when it lies within the leaf's own bounds: an
/// object straddling split planes is a candidate in several leaves, and a
/// hit belonging to a farther leaf must not short-circuit the front-to-back
/// order. This guard is the only duplicate suppression in the tree.
fn nearest_leaf_hit(
    node: &KdNode,
    candidates: &[crate::scene::ObjectIdx],
    objects: &ObjectStore,
    ray: &Ray,
) -> Option<Hit> {
    candidates
        .iter()
        .filter_map(|&object| {
            let point = objects[object].intersect(ray)?;
            node.bounds.contains(&point).then_some(Hit { object, point })
        })
        .min_by_key(|hit| OrderedFloat((hit.point - ray.start).norm_squared()))
}
