mod building;
mod traversal;

use crate::geometry::{BoundingBox, FloatType, WorldPoint};

use super::ObjectIdx;

/// Cost model constants for the surface area heuristic.
///
/// Higher `traverse_cost` biases toward shallower trees with larger leaves,
/// higher `intersect_cost` toward deeper trees with more aggressive splits.
#[derive(Copy, Clone, Debug)]
pub struct BuildConfig {
    pub intersect_cost: FloatType,
    pub traverse_cost: FloatType,
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            intersect_cost: 10.0,
            traverse_cost: 100.0,
        }
    }
}

/// Kd-tree over the scene's objects. Built once, read-only afterwards.
///
/// Leaves reference objects by index and never own them; an object whose
/// bounds straddle a split plane is referenced from both subtrees.
#[derive(Debug)]
pub struct KdTree {
    root: KdNode,
}

#[derive(Debug)]
struct KdNode {
    bounds: BoundingBox,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Leaf {
        candidates: Vec<ObjectIdx>,
    },
    Inner {
        axis: usize,
        coordinate: FloatType,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

/// Nearest intersection found by a traversal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub object: ObjectIdx,
    pub point: WorldPoint,
}

impl KdTree {
    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn depth(node: &KdNode) -> usize {
            match &node.kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Inner { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    /// Total number of candidate references across all leaves.
    /// At least the object count; duplicates come from straddling objects.
    pub fn candidate_references(&self) -> usize {
        fn count(node: &KdNode) -> usize {
            match &node.kind {
                NodeKind::Leaf { candidates } => candidates.len(),
                NodeKind::Inner { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}
