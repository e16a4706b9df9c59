use crate::{
    bounds::Bounds,
    distance::Point,
    error::{check_point, Error, Result},
};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::ops::Range;

/// Node positions of every cluster, stored back to back.
///
/// `boundaries` starts at 0 and ends at the number of nodes; cluster `i` owns
/// the half-open range `boundaries[i]..boundaries[i + 1]`. The first node of a
/// cluster is its head, placed exactly at the cluster center.
#[derive(Clone, Debug)]
pub struct PointCluster {
    positions: Vec<Point>,
    boundaries: Vec<usize>,
}

impl Default for PointCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCluster {
    #[must_use]
    pub fn new() -> Self {
        PointCluster {
            positions: Vec::new(),
            boundaries: vec![0],
        }
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.boundaries.clear();
        self.boundaries.push(0);
    }

    /// Appends a cluster of `count` nodes: the head at `center` followed by
    /// `count - 1` nodes drawn from a normal distribution around it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `count` is zero, `center` is not
    /// finite, `spread` is negative or not finite, or a sampled node lands
    /// outside the finite range. Nothing is appended on error.
    pub fn append_cluster<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        center: Point,
        spread: f64,
        rng: &mut R,
    ) -> Result<Range<usize>> {
        if count < 1 {
            return Err(Error::invalid("a cluster needs at least one node"));
        }
        check_point(&center)?;
        if !spread.is_finite() || spread < 0.0 {
            return Err(Error::invalid(format!(
                "spread must be a non-negative number, got {spread}"
            )));
        }
        let normal_x =
            Normal::new(center[0], spread).map_err(|e| Error::invalid(e.to_string()))?;
        let normal_y =
            Normal::new(center[1], spread).map_err(|e| Error::invalid(e.to_string()))?;

        let mut cluster: Vec<Point> = Vec::new();
        cluster
            .try_reserve(count)
            .map_err(|_| Error::invalid(format!("cannot allocate a cluster of {count} nodes")))?;
        cluster.push(center);
        for _ in 1..count {
            let point = [normal_x.sample(rng), normal_y.sample(rng)];
            check_point(&point)?;
            cluster.push(point);
        }

        let start = self.positions.len();
        self.positions.append(&mut cluster);
        self.boundaries.push(self.positions.len());

        self.check_boundaries()?;
        Ok(start..self.positions.len())
    }

    /// Removes the nodes at the given global indices and shifts the cluster
    /// boundaries so that every cluster keeps its surviving nodes.
    ///
    /// Duplicate indices count once. Nothing is removed if any index is out of
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an out-of-range index and
    /// [`Error::InconsistentState`] if the boundaries were already corrupt.
    pub fn remove(&mut self, indices: &[usize]) -> Result<usize> {
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.positions.len()) {
            return Err(Error::invalid(format!(
                "node index {bad} is out of range for {} nodes",
                self.positions.len()
            )));
        }
        let mut removed = indices.to_vec();
        removed.sort_unstable();
        removed.dedup();

        shift_boundaries(&mut self.boundaries, &removed);

        // Order-preserving delete, walking the sorted indices alongside
        let mut position = 0;
        let mut next = removed.iter().peekable();
        self.positions.retain(|_| {
            let drop = next.peek() == Some(&&position);
            if drop {
                next.next();
            }
            position += 1;
            !drop
        });

        self.check_boundaries()?;
        Ok(removed.len())
    }

    /// Half-open node ranges of every cluster, in creation order.
    pub fn cluster_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.boundaries.windows(2).map(|pair| pair[0]..pair[1])
    }

    /// The cluster owning the node at `index`.
    #[must_use]
    pub fn cluster_of(&self, index: usize) -> Option<usize> {
        if index >= self.positions.len() {
            return None;
        }
        // Empty clusters share their boundary with the next one, so take the last match
        Some(self.boundaries.partition_point(|&b| b <= index) - 1)
    }

    /// Bounding box of every node, `None` when there are no nodes.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.positions)
    }

    #[must_use]
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    #[must_use]
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Verifies that the boundaries start at zero, never decrease and end at
    /// the number of nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentState`] describing the first violation.
    pub fn check_boundaries(&self) -> Result<()> {
        match self.boundaries.first() {
            Some(&0) => {}
            first => {
                return Err(Error::InconsistentState(format!(
                    "boundaries must start at 0, found {first:?}"
                )))
            }
        }
        if let Some(pair) = self.boundaries.windows(2).find(|pair| pair[0] > pair[1]) {
            return Err(Error::InconsistentState(format!(
                "boundaries decrease from {} to {}",
                pair[0], pair[1]
            )));
        }
        let last = self.boundaries[self.boundaries.len() - 1];
        if last != self.positions.len() {
            return Err(Error::InconsistentState(format!(
                "last boundary is {last} but there are {} nodes",
                self.positions.len()
            )));
        }
        Ok(())
    }
}

/// Lowers every boundary by the number of removed indices strictly below it.
///
/// Both slices must be sorted ascending and `removed` must be free of
/// duplicates; one sweep handles all boundaries.
fn shift_boundaries(boundaries: &mut [usize], removed: &[usize]) {
    let mut below = 0;
    for boundary in boundaries.iter_mut() {
        while below < removed.len() && removed[below] < *boundary {
            below += 1;
        }
        *boundary -= below;
    }
}

#[cfg(test)]
mod tests {
    use super::{shift_boundaries, PointCluster};
    use crate::error::Error;
    use rand::{rngs::StdRng, SeedableRng};

    fn two_clusters() -> PointCluster {
        let mut rng = StdRng::seed_from_u64(0);
        let mut cluster = PointCluster::new();
        cluster
            .append_cluster(5, [0.0, 0.0], 1.0, &mut rng)
            .expect("valid cluster");
        cluster
            .append_cluster(3, [10.0, 10.0], 1.0, &mut rng)
            .expect("valid cluster");
        cluster
    }

    #[test]
    fn shift() {
        let mut boundaries = vec![0, 5, 8];
        shift_boundaries(&mut boundaries, &[2, 6]);
        assert_eq!(boundaries, vec![0, 4, 6]);

        // A removed index equal to a boundary belongs to the next cluster
        let mut boundaries = vec![0, 5, 8];
        shift_boundaries(&mut boundaries, &[5]);
        assert_eq!(boundaries, vec![0, 5, 7]);

        let mut boundaries = vec![0, 3, 3, 6];
        shift_boundaries(&mut boundaries, &[0, 1, 2]);
        assert_eq!(boundaries, vec![0, 0, 0, 3]);
    }

    #[test]
    fn append() {
        let cluster = two_clusters();
        assert_eq!(cluster.len(), 8);
        assert_eq!(cluster.num_clusters(), 2);
        assert_eq!(cluster.boundaries(), &[0, 5, 8]);

        // The head of each cluster sits exactly on its center
        assert_eq!(cluster.positions()[0], [0.0, 0.0]);
        assert_eq!(cluster.positions()[5], [10.0, 10.0]);

        let ranges = cluster.cluster_ranges().collect::<Vec<_>>();
        assert_eq!(ranges, vec![0..5, 5..8]);
    }

    #[test]
    fn append_without_spread() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut cluster = PointCluster::new();
        let range = cluster
            .append_cluster(3, [2.0, -1.0], 0.0, &mut rng)
            .expect("valid cluster");
        assert_eq!(range, 0..3);
        assert_eq!(cluster.positions(), &[[2.0, -1.0]; 3]);
    }

    #[test]
    fn append_invalid() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut cluster = PointCluster::new();
        assert!(matches!(
            cluster.append_cluster(0, [0.0, 0.0], 1.0, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cluster.append_cluster(4, [0.0, 0.0], -1.0, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cluster.append_cluster(4, [f64::NAN, 0.0], 1.0, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert!(cluster.is_empty());
        assert_eq!(cluster.boundaries(), &[0]);
    }

    #[test]
    fn append_overflowing_spread() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut cluster = two_clusters();
        let before = cluster.positions().to_vec();
        assert!(matches!(
            cluster.append_cluster(200, [0.0, 0.0], 1e308, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(cluster.positions(), before.as_slice());
        assert_eq!(cluster.boundaries(), &[0, 5, 8]);
    }

    #[test]
    fn append_too_many() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut cluster = PointCluster::new();
        assert!(matches!(
            cluster.append_cluster(usize::MAX, [0.0, 0.0], 1.0, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert!(cluster.is_empty());
        assert_eq!(cluster.boundaries(), &[0]);
    }

    #[test]
    fn remove() {
        let mut cluster = two_clusters();
        let before = cluster.positions().to_vec();

        let removed = cluster.remove(&[2, 6]).expect("valid indices");
        assert_eq!(removed, 2);
        assert_eq!(cluster.boundaries(), &[0, 4, 6]);
        assert_eq!(cluster.len(), 6);

        let expected = [0, 1, 3, 4, 5, 7].map(|i| before[i]);
        assert_eq!(cluster.positions(), &expected);
    }

    #[test]
    fn remove_duplicates() {
        let mut cluster = two_clusters();
        let removed = cluster.remove(&[3, 3, 1, 3]).expect("valid indices");
        assert_eq!(removed, 2);
        assert_eq!(cluster.boundaries(), &[0, 3, 6]);
    }

    #[test]
    fn remove_whole_cluster() {
        let mut cluster = two_clusters();
        cluster.remove(&[0, 1, 2, 3, 4]).expect("valid indices");
        assert_eq!(cluster.boundaries(), &[0, 0, 3]);
        assert_eq!(
            cluster.cluster_ranges().collect::<Vec<_>>(),
            vec![0..0, 0..3]
        );
        assert_eq!(cluster.cluster_of(0), Some(1));

        cluster.remove(&[0, 1, 2]).expect("valid indices");
        assert_eq!(cluster.boundaries(), &[0, 0, 0]);
        assert!(cluster.is_empty());
        assert!(cluster.bounds().is_none());
    }

    #[test]
    fn remove_out_of_range() {
        let mut cluster = two_clusters();
        let before = cluster.positions().to_vec();

        let result = cluster.remove(&[1, 8]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        // Nothing was touched
        assert_eq!(cluster.positions(), before.as_slice());
        assert_eq!(cluster.boundaries(), &[0, 5, 8]);
    }

    #[test]
    fn cluster_of() {
        let cluster = two_clusters();
        assert_eq!(cluster.cluster_of(0), Some(0));
        assert_eq!(cluster.cluster_of(4), Some(0));
        assert_eq!(cluster.cluster_of(5), Some(1));
        assert_eq!(cluster.cluster_of(7), Some(1));
        assert_eq!(cluster.cluster_of(8), None);
    }

    #[test]
    fn reset() {
        let mut cluster = two_clusters();
        cluster.reset();
        assert!(cluster.is_empty());
        assert_eq!(cluster.num_clusters(), 0);
        assert_eq!(cluster.boundaries(), &[0]);
        assert!(cluster.check_boundaries().is_ok());
    }

    #[test]
    fn corrupt_boundaries() {
        let mut cluster = two_clusters();
        cluster.boundaries = vec![0, 6, 5];
        assert!(matches!(
            cluster.check_boundaries(),
            Err(Error::InconsistentState(_))
        ));

        cluster.boundaries = vec![0, 5, 9];
        assert!(matches!(
            cluster.check_boundaries(),
            Err(Error::InconsistentState(_))
        ));

        cluster.boundaries = vec![1, 5, 8];
        assert!(matches!(
            cluster.check_boundaries(),
            Err(Error::InconsistentState(_))
        ));
    }
}
