use conv::ValueFrom;
use std::collections::{btree_map, BTreeMap, VecDeque};

/// Undirected graph over node indices, stored as adjacency lists.
pub struct ProximityGraph {
    adjacency: Vec<Vec<usize>>,
    num_edges: usize,
}

impl ProximityGraph {
    /// Builds the graph of `num_nodes` nodes from unordered pairs.
    ///
    /// Self-pairs and repeated pairs are ignored.
    #[must_use]
    pub fn from_pairs(num_nodes: usize, pairs: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![Vec::new(); num_nodes];
        for &(a, b) in pairs {
            if a != b {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        let mut num_edges = 0;
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
            num_edges += neighbors.len();
        }
        ProximityGraph {
            adjacency,
            num_edges: num_edges / 2,
        }
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    #[must_use]
    pub fn neighbors_of(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// Hop counts of every node reachable from `root`.
    ///
    /// `root` must be a node of the graph.
    #[must_use]
    pub fn breadth_first(&self, root: usize) -> Reachability {
        let mut hops = BTreeMap::new();
        hops.insert(root, 0);
        let mut queue = VecDeque::from(vec![(root, 0)]);
        while let Some((node, depth)) = queue.pop_front() {
            for &neighbor in &self.adjacency[node] {
                if let btree_map::Entry::Vacant(entry) = hops.entry(neighbor) {
                    entry.insert(depth + 1);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }
        Reachability {
            root,
            num_nodes: self.num_nodes(),
            hops,
        }
    }
}

/// Shortest hop counts from a root node.
///
/// Nodes that cannot reach the root are absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reachability {
    root: usize,
    num_nodes: usize,
    hops: BTreeMap<usize, usize>,
}

impl Reachability {
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    #[must_use]
    pub fn hop_count(&self, node: usize) -> Option<usize> {
        self.hops.get(&node).copied()
    }

    #[must_use]
    pub fn is_connected(&self, node: usize) -> bool {
        self.hops.contains_key(&node)
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[must_use]
    pub fn num_connected(&self) -> usize {
        self.hops.len()
    }

    #[must_use]
    pub fn num_disconnected(&self) -> usize {
        self.num_nodes - self.num_connected()
    }

    /// Share of all nodes that reach the root, in `0.0..=1.0`.
    #[must_use]
    pub fn connected_fraction(&self) -> f64 {
        match (
            f64::value_from(self.num_connected()),
            f64::value_from(self.num_nodes),
        ) {
            (Ok(connected), Ok(total)) if total > 0.0 => connected / total,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn max_hops(&self) -> usize {
        self.hops.values().copied().max().unwrap_or(0)
    }

    /// Number of nodes at each hop count, indexed by hops.
    #[must_use]
    pub fn histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0; self.max_hops() + 1];
        for &hops in self.hops.values() {
            histogram[hops] += 1;
        }
        histogram
    }

    /// `(node, hops)` pairs in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.hops.iter().map(|(&node, &hops)| (node, hops))
    }

    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<usize, usize> {
        &self.hops
    }
}
