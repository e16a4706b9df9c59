use crate::distance::Point;

/// Settings of a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Seed of the random generator, `None` to seed from the OS.
    pub seed: Option<u64>,
    /// Maximum number of nodes in a k-d tree leaf.
    pub leaf_size: usize,
    /// Communication range used when a connectivity request names none.
    pub node_range: f64,
    /// Standard deviation of a scattered cluster when none is given.
    pub scale: f64,
    /// Center of scatter and meteor events when none is given.
    pub location: Point,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            leaf_size: 10,
            node_range: 0.1,
            scale: 1.0,
            location: [0.0, 0.0],
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
