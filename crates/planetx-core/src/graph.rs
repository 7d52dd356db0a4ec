use crate::id::{EdgeId, NodeId};
use crate::paths;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while assembling or querying a world graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("world graph has no origin node")]
    MissingOrigin,
    #[error("world graph has no target node")]
    MissingTarget,
    #[error("origin and target must be different nodes (both {0})")]
    OriginIsTarget(NodeId),
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("edge from {0} to itself")]
    SelfLoop(NodeId),
    #[error("nodes {0} and {1} are not adjacent")]
    NotAdjacent(NodeId, NodeId),
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Integer map coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line (Euclidean) distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Straight-line distance to an arbitrary point.
    pub fn distance_to_point(&self, point: Point) -> f64 {
        (f64::from(self.x) - point.x).hypot(f64::from(self.y) - point.y)
    }
}

/// A continuous map location, used for the ship while it travels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        Self {
            x: f64::from(p.x),
            y: f64::from(p.y),
        }
    }
}

/// Length of an edge between two positions: the straight-line distance
/// rounded up, never less than 1.
pub fn edge_length(a: &Position, b: &Position) -> u32 {
    (a.distance(b).ceil() as u32).max(1)
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// A location on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub position: Position,
    /// Reward initially carried by this node. Collection during a run is
    /// tracked by the mission, not here.
    pub reward: u32,
}

/// An undirected link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Distance, fuel cost and traversal-time basis of this edge. Always > 0.
    pub length: u32,
}

impl Edge {
    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether `node` is one of this edge's endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        node == self.a || node == self.b
    }
}

// ---------------------------------------------------------------------------
// WorldGraph
// ---------------------------------------------------------------------------

/// The map of one run: nodes, undirected weighted edges, the origin and the
/// target, plus metrics derived once after construction.
///
/// Nodes are stored densely (`NodeId(i)` lives at index `i`). Edges live in a
/// `SlotMap` so removing one during trimming leaves every other key valid.
/// A world graph is read-only once built; the only per-run mutable datum on
/// a node, its remaining reward, is owned by the mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGraph {
    seed: u64,
    width: u32,
    height: u32,
    nodes: Vec<Node>,
    edges: SlotMap<EdgeId, Edge>,
    /// Incident edges per node, in insertion order.
    adjacency: Vec<Vec<EdgeId>>,
    origin: NodeId,
    target: NodeId,
    /// Largest straight-line distance from the target to any node.
    furthest_distance: f64,
    /// Shortest-path distance from origin to target (0 if unreachable).
    origin_to_target: u32,
    /// Sum of all edge lengths.
    edge_sum: u32,
}

impl WorldGraph {
    /// Start assembling a graph by hand.
    pub fn builder() -> WorldGraphBuilder {
        WorldGraphBuilder::default()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The node the ship starts on and must return to.
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// The node the search phase must find.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index())
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge)
    }

    /// All surviving edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Edges incident to `node`. Empty for unknown nodes.
    pub fn incident(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node.index())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Neighbors of `node` with the length of the connecting edge.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.incident(node).iter().filter_map(move |&eid| {
            let edge = self.edges.get(eid)?;
            Some((edge.other(node)?, edge.length))
        })
    }

    /// The edge joining `a` and `b`, if they are adjacent.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        self.incident(a)
            .iter()
            .copied()
            .find(|&eid| self.edges.get(eid).is_some_and(|e| e.other(a) == Some(b)))
    }

    /// Whether an edge joins `a` and `b`. A node is never adjacent to itself.
    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.edge_between(a, b).is_some()
    }

    pub fn furthest_distance(&self) -> f64 {
        self.furthest_distance
    }

    /// Minimum travel distance from origin to target.
    pub fn origin_to_target(&self) -> u32 {
        self.origin_to_target
    }

    /// Total length of all edges.
    pub fn edge_sum(&self) -> u32 {
        self.edge_sum
    }

    /// Straight-line distance from `node` to the target.
    pub fn distance_to_target(&self, node: NodeId) -> Option<f64> {
        let n = self.node(node)?;
        let t = self.node(self.target)?;
        Some(n.position.distance(&t.position))
    }

    /// Signal strength at `node`: `1 - distance_to_target / furthest_distance`.
    ///
    /// The target reads 1.0 and the node furthest from it reads 0.0. This is
    /// geometric distance, not graph distance. Unknown nodes read 0.0.
    pub fn signal(&self, node: NodeId) -> f64 {
        match self.distance_to_target(node) {
            Some(_) if self.furthest_distance <= 0.0 => 1.0,
            Some(d) => 1.0 - d / self.furthest_distance,
            None => 0.0,
        }
    }

    /// The node nearest to an arbitrary point, or `None` for an empty graph.
    /// Ties resolve to the lowest id.
    pub fn closest_node(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .map(|n| (n.position.distance_to_point(point), n.id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    /// Per-node reachability from `start` over the surviving edges.
    pub fn reachable_from(&self, start: NodeId) -> Vec<bool> {
        let mut seen = vec![false; self.nodes.len()];
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::new();
        seen[start.index()] = true;
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for (next, _) in self.neighbors(current) {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Whether every node is reachable from the origin.
    pub fn is_connected(&self) -> bool {
        self.reachable_from(self.origin).iter().all(|&r| r)
    }

    // -----------------------------------------------------------------------
    // Crate-internal mutation, used only while a world is being generated
    // -----------------------------------------------------------------------

    /// Remove an edge, unlinking it from both endpoints.
    pub(crate) fn remove_edge(&mut self, edge: EdgeId) -> Option<Edge> {
        let removed = self.edges.remove(edge)?;
        for end in [removed.a, removed.b] {
            if let Some(adj) = self.adjacency.get_mut(end.index()) {
                adj.retain(|&e| e != edge);
            }
        }
        Some(removed)
    }

    /// Recompute the derived metrics after the edge set changed.
    pub(crate) fn recompute_metrics(&mut self) {
        let target = self.nodes[self.target.index()].position;
        self.furthest_distance = self
            .nodes
            .iter()
            .map(|n| n.position.distance(&target))
            .fold(0.0, f64::max);
        let path = paths::shortest_path(self, self.origin, self.target);
        self.origin_to_target = paths::path_weight(self, &path).unwrap_or(0);
        self.edge_sum = self.edges.values().map(|e| e.length).sum();
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`WorldGraph`] from explicit nodes and edges.
///
/// `build` refuses to produce a graph if the origin or target is unset or
/// unknown, or if an edge references a missing node.
#[derive(Debug, Clone, Default)]
pub struct WorldGraphBuilder {
    seed: u64,
    width: u32,
    height: u32,
    nodes: Vec<Node>,
    edges: Vec<(NodeId, NodeId, Option<u32>)>,
    origin: Option<NodeId>,
    target: Option<NodeId>,
}

impl WorldGraphBuilder {
    /// Record the seed this graph was generated from.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the map bounds. Defaults to the bounding box of the nodes.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Add a node and return its id. Ids are assigned in insertion order.
    pub fn add_node(&mut self, name: impl Into<String>, position: Position, reward: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
            position,
            reward,
        });
        id
    }

    /// Connect two nodes; the length is derived from their positions.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.edges.push((a, b, None));
        self
    }

    /// Connect two nodes with an explicit length (clamped to at least 1).
    pub fn connect_with_length(&mut self, a: NodeId, b: NodeId, length: u32) -> &mut Self {
        self.edges.push((a, b, Some(length.max(1))));
        self
    }

    pub fn origin(&mut self, node: NodeId) -> &mut Self {
        self.origin = Some(node);
        self
    }

    pub fn target(&mut self, node: NodeId) -> &mut Self {
        self.target = Some(node);
        self
    }

    /// Build the graph and compute its derived metrics.
    pub fn build(self) -> Result<WorldGraph, GraphError> {
        let origin = self.origin.ok_or(GraphError::MissingOrigin)?;
        let target = self.target.ok_or(GraphError::MissingTarget)?;
        let count = self.nodes.len();
        for id in [origin, target] {
            if id.index() >= count {
                return Err(GraphError::NodeNotFound(id));
            }
        }
        if origin == target {
            return Err(GraphError::OriginIsTarget(origin));
        }

        let mut edges = SlotMap::with_key();
        let mut adjacency = vec![Vec::new(); count];
        for (a, b, length) in self.edges {
            for id in [a, b] {
                if id.index() >= count {
                    return Err(GraphError::NodeNotFound(id));
                }
            }
            if a == b {
                return Err(GraphError::SelfLoop(a));
            }
            let length = length.unwrap_or_else(|| {
                edge_length(&self.nodes[a.index()].position, &self.nodes[b.index()].position)
            });
            let eid = edges.insert(Edge { a, b, length });
            adjacency[a.index()].push(eid);
            adjacency[b.index()].push(eid);
        }

        let (width, height) = if self.width == 0 || self.height == 0 {
            let w = self.nodes.iter().map(|n| n.position.x.max(0) as u32 + 1).max();
            let h = self.nodes.iter().map(|n| n.position.y.max(0) as u32 + 1).max();
            (w.unwrap_or(1), h.unwrap_or(1))
        } else {
            (self.width, self.height)
        };

        let mut graph = WorldGraph {
            seed: self.seed,
            width,
            height,
            nodes: self.nodes,
            edges,
            adjacency,
            origin,
            target,
            furthest_distance: 0.0,
            origin_to_target: 0,
            edge_sum: 0,
        };
        graph.recompute_metrics();
        Ok(graph)
    }
}
