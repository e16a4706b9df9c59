mod bounds;
mod cluster;
mod command;
mod config;
mod distance;
mod error;
mod index;
mod kdtree;
mod reachability;
mod simulation;

pub use bounds::Bounds;
pub use cluster::PointCluster;
pub use command::{Arguments, Command, CommandRegistry, CommandSpec, Outcome};
pub use config::SimulationConfig;
pub use distance::{euclidean, Point};
pub use error::{Error, Result};
pub use index::ConnectivityIndex;
pub use kdtree::KdTree;
pub use reachability::{ProximityGraph, Reachability};
pub use simulation::{Simulation, ROOT};
