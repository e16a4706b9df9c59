use crate::{
    distance::Point,
    error::{check_point, check_radius, Error, Result},
    kdtree::KdTree,
    reachability::{ProximityGraph, Reachability},
};

/// Proximity queries over a snapshot of node positions.
///
/// The index copies the positions it is built from and never sees later
/// changes: after every mutation of the node set, call [`rebuild`] before
/// querying again.
///
/// [`rebuild`]: ConnectivityIndex::rebuild
pub struct ConnectivityIndex {
    tree: KdTree,
}

impl ConnectivityIndex {
    /// Creates an empty index whose tree leaves hold up to `leaf_size` nodes.
    #[must_use]
    pub fn new(leaf_size: usize) -> Option<Self> {
        let tree = KdTree::new(leaf_size)?;
        Some(ConnectivityIndex { tree })
    }

    pub fn rebuild(&mut self, positions: &[Point]) {
        self.tree.build(positions);
    }

    /// Unordered pairs `(i, j)`, `i < j`, of nodes at most `radius` apart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative or NaN radius.
    pub fn pairs_within(&self, radius: f64) -> Result<Vec<(usize, usize)>> {
        check_radius(radius)?;
        Ok(self.tree.pairs_within(radius))
    }

    /// Nodes at most `radius` away from `point`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative or NaN radius or a
    /// non-finite point.
    pub fn within_radius(&self, point: Point, radius: f64) -> Result<Vec<usize>> {
        check_point(&point)?;
        check_radius(radius)?;
        let mut result = self.tree.within_radius(&point, radius);
        result.sort_unstable();
        Ok(result)
    }

    /// The proximity graph connecting every pair of nodes within `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative or NaN range.
    pub fn graph(&self, range: f64) -> Result<ProximityGraph> {
        let pairs = self.pairs_within(range)?;
        Ok(ProximityGraph::from_pairs(self.len(), &pairs))
    }

    /// Hop counts from `root` over the proximity graph of `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `root` is not a node or the range
    /// is negative or NaN.
    pub fn compute_reachability(&self, root: usize, range: f64) -> Result<Reachability> {
        if root >= self.len() {
            return Err(Error::invalid(format!(
                "root {root} is out of range for {} nodes",
                self.len()
            )));
        }
        Ok(self.graph(range)?.breadth_first(root))
    }

    #[must_use]
    pub fn positions(&self) -> &[Point] {
        self.tree.points()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl Default for ConnectivityIndex {
    fn default() -> Self {
        ConnectivityIndex::new(10).expect("Invalid leaf size")
    }
}
