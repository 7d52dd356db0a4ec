//! Seeded world generation.
//!
//! A world is built in a fixed sequence of random draws from one [`SimRng`]:
//! node count, node coordinates, name shuffle, target pick, per-node rewards,
//! then trimming. The same seed, configuration and name pool therefore always
//! produce the same world.

use crate::graph::{GraphError, Point, Position, WorldGraph};
use crate::id::{EdgeId, NodeId};
use crate::names::{NamePool, ORIGIN_NAME, TARGET_NAME};
use crate::rng::SimRng;
use crate::triangulate::{DelaunatorTriangulator, Triangulator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),
    #[error("name pool has {available} names but the world needs {needed}")]
    NamePoolExhausted { needed: usize, available: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters of a generated world. The seed is supplied separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub min_nodes: u32,
    pub max_nodes: u32,
    pub min_reward: u32,
    pub max_reward: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 4096,
            height: 4096,
            min_nodes: 5,
            max_nodes: 750,
            min_reward: 0,
            max_reward: 5000,
        }
    }
}

impl WorldConfig {
    /// Check bounds before any random draw is made.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let invalid = |msg: String| Err(GenerationError::InvalidConfig(msg));
        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "map must have positive size, got {}x{}",
                self.width, self.height
            ));
        }
        if self.width > MAX_SIDE || self.height > MAX_SIDE {
            return invalid(format!(
                "map sides are limited to {MAX_SIDE}, got {}x{}",
                self.width, self.height
            ));
        }
        if self.min_nodes < 2 {
            return invalid(format!("min_nodes must be at least 2, got {}", self.min_nodes));
        }
        if self.min_nodes > self.max_nodes {
            return invalid(format!(
                "min_nodes ({}) exceeds max_nodes ({})",
                self.min_nodes, self.max_nodes
            ));
        }
        if self.min_reward > self.max_reward {
            return invalid(format!(
                "min_reward ({}) exceeds max_reward ({})",
                self.min_reward, self.max_reward
            ));
        }
        let cells = u64::from(self.width) * u64::from(self.height);
        if u64::from(self.max_nodes) > cells {
            return invalid(format!(
                "max_nodes ({}) exceeds the {cells} distinct positions of a {}x{} map",
                self.max_nodes, self.width, self.height
            ));
        }
        // A planar triangulation of n points has fewer than 3n edges, none
        // longer than the diagonal.
        let diagonal = f64::from(self.width).hypot(f64::from(self.height)).ceil() as u64;
        let worst_sum = 3 * u64::from(self.max_nodes) * diagonal;
        if worst_sum > u64::from(u32::MAX) {
            return invalid(format!(
                "a {}x{} map with up to {} nodes could exceed the total edge length limit",
                self.width, self.height, self.max_nodes
            ));
        }
        Ok(())
    }
}

/// Largest map side; coordinates are `i32`.
pub const MAX_SIDE: u32 = i32::MAX as u32;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a world with the default Delaunay triangulation.
pub fn generate(
    config: &WorldConfig,
    seed: u64,
    names: &NamePool,
) -> Result<WorldGraph, GenerationError> {
    generate_with(config, seed, names, &DelaunatorTriangulator)
}

/// Generate a world using the given triangulation.
pub fn generate_with(
    config: &WorldConfig,
    seed: u64,
    names: &NamePool,
    triangulator: &dyn Triangulator,
) -> Result<WorldGraph, GenerationError> {
    config.validate()?;
    let mut rng = SimRng::new(seed);

    let count = rng.range_inclusive(config.min_nodes, config.max_nodes) as usize;
    let needed = count - 2;
    if names.len() < needed {
        return Err(GenerationError::NamePoolExhausted {
            needed,
            available: names.len(),
        });
    }

    let positions = sample_positions(&mut rng, count, config.width, config.height);
    let mut shuffled = names.shuffled(&mut rng).into_iter();
    let target = NodeId(1 + rng.below(count as u64 - 1) as u32);

    let mut builder = WorldGraph::builder()
        .seed(seed)
        .size(config.width, config.height);
    for (i, &position) in positions.iter().enumerate() {
        let reward = draw_reward(&mut rng, config.min_reward, config.max_reward);
        let id = NodeId(i as u32);
        let (name, reward) = if i == 0 {
            (ORIGIN_NAME.to_string(), 0)
        } else if id == target {
            (TARGET_NAME.to_string(), 0)
        } else {
            // Length was checked against `needed` above.
            (shuffled.next().unwrap_or_default(), reward)
        };
        builder.add_node(name, position, reward);
    }

    let points: Vec<Point> = positions.iter().copied().map(Point::from).collect();
    for (a, b) in triangulator.edges(&points) {
        builder.connect(NodeId(a as u32), NodeId(b as u32));
    }
    builder.origin(NodeId(0));
    builder.target(target);
    let mut graph = builder.build()?;

    let removed = trim_edges(&mut graph, &mut rng);
    graph.recompute_metrics();

    tracing::info!(
        seed,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        trimmed = removed,
        target = %graph.target(),
        origin_to_target = graph.origin_to_target(),
        "world generated"
    );
    Ok(graph)
}

/// Sample `count` distinct lattice positions in `[0, width) x [0, height)`.
fn sample_positions(rng: &mut SimRng, count: usize, width: u32, height: u32) -> Vec<Position> {
    let mut seen = HashSet::with_capacity(count);
    let mut positions = Vec::with_capacity(count);
    while positions.len() < count {
        let x = rng.below(u64::from(width)) as i32;
        let y = rng.below(u64::from(height)) as i32;
        if seen.insert((x, y)) {
            positions.push(Position::new(x, y));
        }
    }
    positions
}

/// Reward skewed toward `min`: square a uniform draw before scaling.
fn draw_reward(rng: &mut SimRng, min: u32, max: u32) -> u32 {
    let u = rng.next_f64();
    let span = f64::from(max - min) + 1.0;
    let offset = (u * u * span) as u32;
    (min + offset).min(max)
}

/// Split the edges into a depth-first spanning tree from the origin and the
/// removal candidates outside it, in discovery order.
///
/// The traversal pops `(node, via_edge)` pairs from an explicit stack. The
/// first time a node is popped, its via-edge becomes a tree edge; every
/// other popped edge that is not a tree edge is a candidate.
fn spanning_split(graph: &WorldGraph) -> (HashSet<EdgeId>, Vec<EdgeId>) {
    let mut visited = vec![false; graph.node_count()];
    let mut tree: HashSet<EdgeId> = HashSet::new();
    let mut listed: HashSet<EdgeId> = HashSet::new();
    let mut candidates: Vec<EdgeId> = Vec::new();
    let mut stack: Vec<(NodeId, Option<EdgeId>)> = vec![(graph.origin(), None)];

    while let Some((node, via)) = stack.pop() {
        if !visited[node.index()] {
            visited[node.index()] = true;
            if let Some(edge) = via {
                tree.insert(edge);
            }
            for &eid in graph.incident(node) {
                if let Some(next) = graph.edge(eid).and_then(|e| e.other(node)) {
                    stack.push((next, Some(eid)));
                }
            }
        } else if let Some(edge) = via {
            if !tree.contains(&edge) && listed.insert(edge) {
                candidates.push(edge);
            }
        }
    }
    (tree, candidates)
}

/// Remove a random number of candidates, drawn from `[0, candidates)`,
/// leaving the spanning tree intact. Returns the number removed.
fn trim_edges(graph: &mut WorldGraph, rng: &mut SimRng) -> usize {
    let (_, mut candidates) = spanning_split(graph);
    let removals = rng.below(candidates.len() as u64) as usize;
    for _ in 0..removals {
        let index = rng.below(candidates.len() as u64) as usize;
        let edge = candidates.swap_remove(index);
        graph.remove_edge(edge);
    }
    tracing::debug!(candidates = candidates.len() + removals, removals, "edges trimmed");
    removals
}
