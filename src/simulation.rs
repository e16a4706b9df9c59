use crate::{
    cluster::PointCluster,
    config::SimulationConfig,
    distance::Point,
    error::{check_radius, Error, Result},
    index::ConnectivityIndex,
    reachability::Reachability,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Index of the root node: the head of the first scattered cluster.
pub const ROOT: usize = 0;

/// Mesh network simulation: clustered nodes, the proximity index over them
/// and the last connectivity result.
///
/// Every mutation rebuilds the index before returning, so queries always see
/// the current node set.
pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    clusters: PointCluster,
    index: ConnectivityIndex,
    reachability: Option<Reachability>,
}

impl Simulation {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the configured leaf size is zero
    /// or the default range or scale is negative.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let index = ConnectivityIndex::new(config.leaf_size)
            .ok_or_else(|| Error::invalid("leaf size must be at least 1"))?;
        check_radius(config.node_range)?;
        if config.scale.is_nan() || config.scale < 0.0 {
            return Err(Error::invalid(format!(
                "default scale must be non-negative, got {}",
                config.scale
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Simulation {
            config,
            rng,
            clusters: PointCluster::new(),
            index,
            reachability: None,
        })
    }

    pub fn reset(&mut self) {
        self.clusters.reset();
        self.index.rebuild(self.clusters.positions());
        self.reachability = None;
        info!("simulation reset");
    }

    /// Scatters a cluster of `num` nodes around `loc`.
    ///
    /// # Errors
    ///
    /// Fails like [`PointCluster::append_cluster`].
    pub fn scatter(&mut self, num: usize, loc: Point, scale: f64) -> Result<usize> {
        self.clusters.append_cluster(num, loc, scale, &mut self.rng)?;
        self.index.rebuild(self.clusters.positions());
        self.reachability = None;
        info!(
            num,
            x = loc[0],
            y = loc[1],
            scale,
            total = self.clusters.len(),
            "scattered cluster"
        );
        Ok(num)
    }

    /// Destroys every node within `size` of `loc`, returning how many died.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative or NaN size or a
    /// non-finite location.
    pub fn meteor(&mut self, size: f64, loc: Point) -> Result<usize> {
        let hit = self.index.within_radius(loc, size)?;
        let destroyed = self.clusters.remove(&hit)?;
        self.index.rebuild(self.clusters.positions());
        if destroyed > 0 {
            self.reachability = None;
        }
        debug!(
            size,
            x = loc[0],
            y = loc[1],
            destroyed,
            remaining = self.clusters.len(),
            "meteor impact"
        );
        Ok(destroyed)
    }

    /// Drops `num` meteors of `size` at uniform random spots inside the
    /// bounding box of the nodes, one at a time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative or NaN size.
    pub fn meteors(&mut self, size: f64, num: usize) -> Result<usize> {
        check_radius(size)?;
        let Some(bounds) = self.clusters.bounds() else {
            warn!(num, "no nodes to hit");
            return Ok(0);
        };

        let mut destroyed = 0;
        for _ in 0..num {
            let loc = [
                uniform(&mut self.rng, bounds.min[0], bounds.max[0]),
                uniform(&mut self.rng, bounds.min[1], bounds.max[1]),
            ];
            destroyed += self.meteor(size, loc)?;
        }
        info!(
            size,
            num,
            destroyed,
            remaining = self.clusters.len(),
            "meteor shower"
        );
        Ok(destroyed)
    }

    /// Computes hop counts from the root over the graph of `node_range` and
    /// keeps them as the current result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if there are no nodes or the range is
    /// negative or NaN.
    pub fn make_graph(&mut self, node_range: f64) -> Result<&Reachability> {
        let reachability = self.index.compute_reachability(ROOT, node_range)?;
        info!(
            node_range,
            nodes = reachability.num_nodes(),
            connected = reachability.num_connected(),
            disconnected = reachability.num_disconnected(),
            max_hops = reachability.max_hops(),
            "computed connectivity"
        );
        Ok(&*self.reachability.insert(reachability))
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.clusters.len()
    }

    /// Nodes reaching the root in the last result, 0 if there is none.
    #[must_use]
    pub fn num_connected(&self) -> usize {
        self.reachability
            .as_ref()
            .map_or(0, Reachability::num_connected)
    }

    #[must_use]
    pub fn num_disconnected(&self) -> usize {
        self.num_nodes() - self.num_connected()
    }

    /// Last connectivity result, dropped whenever the node set changes.
    #[must_use]
    pub fn reachability(&self) -> Option<&Reachability> {
        self.reachability.as_ref()
    }

    #[must_use]
    pub fn clusters(&self) -> &PointCluster {
        &self.clusters
    }

    #[must_use]
    pub fn index(&self) -> &ConnectivityIndex {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if low >= high {
        return low;
    }
    if (high - low).is_finite() {
        rng.gen_range(low..high)
    } else {
        // The span overflows, so weight the ends instead
        let t: f64 = rng.gen();
        (low * (1.0 - t) + high * t).clamp(low, high)
    }
}
