use crate::{
    bounds::Bounds,
    distance::{euclidean, Point},
};
use conv::ValueFrom;
use ordered_float::OrderedFloat;

struct Node {
    bounds: Bounds,
    start: usize,
    end: usize,
    left: usize,
    right: usize,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == usize::MAX
    }
}

/// Static k-d tree over a snapshot of 2D points.
///
/// Points keep the index they had in the slice passed to [`KdTree::build`].
/// Each node covers a contiguous run of `order`, so leaves are scanned without
/// chasing pointers.
pub struct KdTree {
    leaf_size: usize,
    root: usize,
    points: Vec<Point>,
    order: Vec<usize>,
    nodes: Vec<Node>,
}

impl KdTree {
    #[must_use]
    pub fn new(leaf_size: usize) -> Option<Self> {
        if leaf_size == 0 {
            return None;
        }
        Some(KdTree {
            leaf_size,
            root: usize::MAX,
            points: Vec::new(),
            order: Vec::new(),
            nodes: Vec::new(),
        })
    }

    /// Replaces the indexed points, discarding the previous tree.
    pub fn build(&mut self, points: &[Point]) {
        self.points = points.to_vec();
        self.order = (0..points.len()).collect();
        self.nodes.clear();
        self.root = if points.is_empty() {
            usize::MAX
        } else {
            self.build_node(0, points.len())
        };
    }

    #[must_use]
    pub fn within_radius(&self, point: &Point, radius: f64) -> Vec<usize> {
        let mut result = Vec::new();
        if self.root == usize::MAX {
            return result;
        }
        let mut stack = vec![self.root];
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id];
            if node.bounds.min_distance(point) > radius {
                continue;
            }
            if node.is_leaf() {
                for &idx in &self.order[node.start..node.end] {
                    if euclidean(&self.points[idx], point) <= radius {
                        result.push(idx);
                    }
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
        result
    }

    /// All pairs `(i, j)` with `i < j` at distance at most `radius`, sorted.
    #[must_use]
    pub fn pairs_within(&self, radius: f64) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, point) in self.points.iter().enumerate() {
            let mut neighbors = self.within_radius(point, radius);
            neighbors.retain(|&j| j > i);
            neighbors.sort_unstable();
            pairs.extend(neighbors.into_iter().map(|j| (i, j)));
        }
        pairs
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        if self.root == usize::MAX {
            return 0;
        }
        let mut height = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((node_id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[node_id];
            if !node.is_leaf() {
                stack.push((node.left, depth + 1));
                stack.push((node.right, depth + 1));
            }
        }
        height
    }

    fn build_node(&mut self, start: usize, end: usize) -> usize {
        let mut bounds = Bounds::point(self.points[self.order[start]]);
        for &idx in &self.order[start + 1..end] {
            bounds.extend(&self.points[idx]);
        }

        if end - start <= self.leaf_size {
            return self.add_node(Node {
                bounds,
                start,
                end,
                left: usize::MAX,
                right: usize::MAX,
            });
        }

        // Partition around the median of the split dimension
        let axis = self.split_dimension(start, end);
        let mid = start + (end - start) / 2;
        let points = &self.points;
        self.order[start..end]
            .select_nth_unstable_by_key(mid - start, |&idx| OrderedFloat(points[idx][axis]));

        let left = self.build_node(start, mid);
        let right = self.build_node(mid, end);
        self.add_node(Node {
            bounds,
            start,
            end,
            left,
            right,
        })
    }

    fn split_dimension(&self, start: usize, end: usize) -> usize {
        let Ok(count) = f64::value_from(end - start) else {
            return 0;
        };
        let entries = &self.order[start..end];

        let mut mean = [0.0; 2];
        for &idx in entries {
            for (axis, x) in self.points[idx].iter().enumerate() {
                mean[axis] += x;
            }
        }
        for x in &mut mean {
            *x /= count;
        }

        let mut variance = [0.0; 2];
        for &idx in entries {
            for (axis, x) in self.points[idx].iter().enumerate() {
                variance[axis] += (x - mean[axis]).powi(2);
            }
        }

        // Find the dimension with the maximum variance
        variance
            .iter()
            .enumerate()
            .max_by_key(|(_, &variance)| OrderedFloat(variance))
            .map_or(0, |(i, _)| i)
    }

    fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

impl Default for KdTree {
    fn default() -> Self {
        KdTree::new(10).expect("Invalid leaf size")
    }
}
