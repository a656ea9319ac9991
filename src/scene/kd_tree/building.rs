use index_vec::IndexVec;
use ordered_float::OrderedFloat;

use crate::geometry::{BoundingBox, EPSILON, FloatType, WorldPoint};
use crate::scene::{ObjectIdx, ObjectStore};

use super::{BuildConfig, KdNode, KdTree, NodeKind};

const BIN_COUNT: usize = 32;

impl KdTree {
    pub fn build(objects: &ObjectStore, config: &BuildConfig) -> KdTree {
        let boxes: IndexVec<ObjectIdx, BoundingBox> =
            objects.iter().map(|o| o.bounding_box()).collect();

        let bounds = BoundingBox::enclosing(boxes.iter().cloned()).unwrap_or_else(|| {
            // Empty scene: a point-sized root that every ray misses.
            BoundingBox::new(WorldPoint::origin(), WorldPoint::origin())
        });
        let candidates = boxes.indices().collect();

        KdTree {
            root: build_node(bounds, candidates, &boxes, config),
        }
    }
}

fn build_node(
    bounds: BoundingBox,
    candidates: Vec<ObjectIdx>,
    boxes: &IndexVec<ObjectIdx, BoundingBox>,
    config: &BuildConfig,
) -> KdNode {
    let Some(split) = find_best_split(&bounds, &candidates, boxes, config) else {
        return KdNode {
            bounds,
            kind: NodeKind::Leaf { candidates },
        };
    };

    let (left_bounds, right_bounds) = bounds.split(split.axis, split.proportion);
    let coordinate = left_bounds.high(split.axis);

    // An object whose bounds straddle the plane goes to both children.
    let mut left_candidates = Vec::new();
    let mut right_candidates = Vec::new();
    for &idx in &candidates {
        if boxes[idx].low(split.axis) < coordinate + EPSILON {
            left_candidates.push(idx);
        }
        if boxes[idx].high(split.axis) > coordinate - EPSILON {
            right_candidates.push(idx);
        }
    }

    KdNode {
        bounds,
        kind: NodeKind::Inner {
            axis: split.axis,
            coordinate,
            left: Box::new(build_node(left_bounds, left_candidates, boxes, config)),
            right: Box::new(build_node(right_bounds, right_candidates, boxes, config)),
        },
    }
}

#[derive(Copy, Clone, Debug)]
struct Split {
    axis: usize,
    proportion: FloatType,
    cost: FloatType,
}

/// Binned SAH search over all three axes. Returns `None` when no candidate
/// split beats the cost of leaving the node a leaf.
fn find_best_split(
    bounds: &BoundingBox,
    candidates: &[ObjectIdx],
    boxes: &IndexVec<ObjectIdx, BoundingBox>,
    config: &BuildConfig,
) -> Option<Split> {
    if candidates.len() < 2 {
        return None;
    }
    let baseline = config.intersect_cost * candidates.len() as FloatType;

    (0..3)
        .filter(|&axis| bounds.length(axis) > EPSILON)
        .flat_map(|axis| axis_splits(axis, bounds, candidates, boxes, config))
        .min_by_key(|split| OrderedFloat(split.cost))
        .filter(|split| split.cost < baseline)
}

/// Scores the `BIN_COUNT - 1` interior bin boundaries of one axis.
fn axis_splits(
    axis: usize,
    bounds: &BoundingBox,
    candidates: &[ObjectIdx],
    boxes: &IndexVec<ObjectIdx, BoundingBox>,
    config: &BuildConfig,
) -> impl Iterator<Item = Split> {
    let axis_low = bounds.low(axis);
    let axis_length = bounds.length(axis);
    let n = candidates.len();

    let mut low_bins = [0usize; BIN_COUNT];
    let mut high_bins = [0usize; BIN_COUNT];
    for &idx in candidates {
        low_bins[bin_index(boxes[idx].low(axis), axis_low, axis_length)] += 1;
        high_bins[bin_index(boxes[idx].high(axis), axis_low, axis_length)] += 1;
    }

    // Suffix sum: low_bins[i] = objects whose low extent is at or beyond bin i.
    // Prefix sum: high_bins[i] = objects whose high extent is at or before bin i.
    for i in (0..BIN_COUNT - 1).rev() {
        low_bins[i] += low_bins[i + 1];
    }
    for i in 1..BIN_COUNT {
        high_bins[i] += high_bins[i - 1];
    }

    // Half-surface area proxy for the face exposed at a boundary: the base
    // face plus one step of the two side faces per bin.
    let step = axis_length / BIN_COUNT as FloatType;
    let (a1, a2) = ((axis + 1) % 3, (axis + 2) % 3);
    let s_base = bounds.length(a1) * bounds.length(a2);
    let s_step = step * (bounds.length(a1) + bounds.length(a2));
    let s_parent = s_base + BIN_COUNT as FloatType * s_step;

    let intersect_cost = config.intersect_cost;
    let traverse_cost = config.traverse_cost;

    (0..BIN_COUNT - 1).map(move |i| {
        let s_left = s_base + (i + 1) as FloatType * s_step;
        let s_right = s_base + (BIN_COUNT - i - 1) as FloatType * s_step;

        // Straddlers of the boundary are counted on both sides, consistently
        // with how the partition later duplicates them.
        let count_left = (n - low_bins[i + 1]) as FloatType;
        let count_right = (n - high_bins[i]) as FloatType;

        Split {
            axis,
            proportion: (i + 1) as FloatType / BIN_COUNT as FloatType,
            cost: traverse_cost
                + intersect_cost * (s_left * count_left + s_right * count_right) / s_parent,
        }
    })
}

fn bin_index(coordinate: FloatType, axis_low: FloatType, axis_length: FloatType) -> usize {
    let bin = ((coordinate - axis_low) / axis_length * BIN_COUNT as FloatType) as isize;
    bin.clamp(0, BIN_COUNT as isize - 1) as usize
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::ColorVector;
    use crate::scene::primitives::{Polygon, Sphere};
    use crate::scene::{Material, Object};
    use assert2::{assert, let_assert};

    pub(crate) fn sphere_store(
        centers: impl IntoIterator<Item = [FloatType; 3]>,
        radius: FloatType,
    ) -> ObjectStore {
        centers
            .into_iter()
            .map(|c| {
                Box::new(Sphere::new(
                    c.into(),
                    radius,
                    Material::matte(ColorVector::repeat(0.5)),
                )) as Box<dyn Object>
            })
            .collect()
    }

    fn leaf_candidates(node: &KdNode, out: &mut Vec<ObjectIdx>) {
        match &node.kind {
            NodeKind::Leaf { candidates } => out.extend(candidates.iter().copied()),
            NodeKind::Inner { left, right, .. } => {
                leaf_candidates(left, out);
                leaf_candidates(right, out);
            }
        }
    }

    #[test]
    fn empty_scene_builds_an_empty_leaf() {
        let objects = ObjectStore::new();
        let tree = KdTree::build(&objects, &BuildConfig::default());

        let_assert!(NodeKind::Leaf { candidates } = &tree.root.kind);
        assert!(candidates.is_empty());
    }

    #[test]
    fn single_object_scene_stays_a_leaf() {
        let objects = sphere_store([[0.0, 0.0, 0.0]], 1.0);
        let tree = KdTree::build(&objects, &BuildConfig::default());

        let_assert!(NodeKind::Leaf { candidates } = &tree.root.kind);
        assert!(candidates == &[ObjectIdx::new(0)]);
    }

    // The default 10/100 cost constants only start splitting for larger
    // scenes; a cheap traversal makes the structure of small trees visible.
    fn eager_config() -> BuildConfig {
        BuildConfig {
            intersect_cost: 10.0,
            traverse_cost: 10.0,
        }
    }

    #[test]
    fn spread_objects_get_split() {
        let objects = sphere_store((0..16).map(|i| [4.0 * i as FloatType, 0.0, 0.0]), 1.0);
        let tree = KdTree::build(&objects, &eager_config());

        let_assert!(NodeKind::Inner { axis, .. } = &tree.root.kind);
        assert!(*axis == 0);
        assert!(tree.depth() > 1);
    }

    #[test]
    fn no_object_is_dropped_by_partitioning() {
        let objects = sphere_store(
            (0..4)
                .flat_map(|x| (0..4).map(move |y| [5.0 * x as FloatType, 5.0 * y as FloatType, 0.0])),
            1.0,
        );
        let tree = KdTree::build(&objects, &eager_config());

        let mut seen = Vec::new();
        leaf_candidates(&tree.root, &mut seen);
        seen.sort();
        seen.dedup();
        assert!(seen == objects.indices().collect::<Vec<_>>());
        assert!(tree.candidate_references() >= objects.len());
    }

    #[test]
    fn straddling_object_lands_in_both_children() {
        // Two tight sphere clusters and one thin quadrangle spanning the gap.
        let mut centers: Vec<[FloatType; 3]> = Vec::new();
        centers.extend((0..6).map(|i| [i as FloatType, 0.0, 0.0]));
        centers.extend((0..6).map(|i| [100.0 + i as FloatType, 0.0, 0.0]));
        let mut objects = sphere_store(centers, 1.0);
        objects.push(Box::new(Polygon::quadrangle(
            [
                WorldPoint::new(0.0, -1.0, 0.0),
                WorldPoint::new(100.0, -1.0, 0.0),
                WorldPoint::new(100.0, 1.0, 0.0),
                WorldPoint::new(0.0, 1.0, 0.0),
            ],
            Material::matte(ColorVector::repeat(0.5)),
        )));
        let straddler = objects.last_idx();

        let tree = KdTree::build(&objects, &eager_config());
        let_assert!(NodeKind::Inner { axis, left, right, .. } = &tree.root.kind);
        assert!(*axis == 0);

        let mut left_seen = Vec::new();
        let mut right_seen = Vec::new();
        leaf_candidates(left, &mut left_seen);
        leaf_candidates(right, &mut right_seen);
        assert!(left_seen.contains(&straddler));
        assert!(right_seen.contains(&straddler));
    }

    #[test]
    fn prohibitive_traverse_cost_keeps_the_root_a_leaf() {
        let objects = sphere_store((0..16).map(|i| [4.0 * i as FloatType, 0.0, 0.0]), 1.0);
        let config = BuildConfig {
            intersect_cost: 10.0,
            traverse_cost: 1e12,
        };
        let tree = KdTree::build(&objects, &config);

        let_assert!(NodeKind::Leaf { candidates } = &tree.root.kind);
        assert!(candidates.len() == objects.len());
    }

    #[test]
    fn higher_intersect_cost_splits_at_least_as_deep() {
        let objects = sphere_store(
            (0..8).flat_map(|x| (0..2).map(move |y| [6.0 * x as FloatType, 6.0 * y as FloatType, 0.0])),
            1.0,
        );
        let shallow = KdTree::build(
            &objects,
            &BuildConfig {
                intersect_cost: 1.0,
                traverse_cost: 100.0,
            },
        );
        let deep = KdTree::build(
            &objects,
            &BuildConfig {
                intersect_cost: 100.0,
                traverse_cost: 1.0,
            },
        );
        assert!(deep.depth() >= shallow.depth());
    }
}
