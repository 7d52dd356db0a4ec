//! Single-source shortest paths over a [`WorldGraph`].
//!
//! Dijkstra with a binary heap. Instead of a decrease-key operation, an
//! improved distance pushes a fresh heap entry and stale entries are skipped
//! when popped. Every call is independent; nothing is cached between calls.

use crate::graph::{GraphError, WorldGraph};
use crate::id::NodeId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Shortest path from `start` to `end`, both endpoints included.
///
/// Returns `[start]` when `start == end` and an empty path when `end` is
/// unreachable or either node is unknown. Among equal-length paths the one
/// returned is unspecified.
pub fn shortest_path(graph: &WorldGraph, start: NodeId, end: NodeId) -> Vec<NodeId> {
    if !graph.contains(start) || !graph.contains(end) {
        return Vec::new();
    }
    if start == end {
        return vec![start];
    }

    let n = graph.node_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev: Vec<Option<NodeId>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[start.index()] = 0;
    heap.push(Reverse((0u64, start)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if d > dist[node.index()] {
            continue;
        }
        if node == end {
            break;
        }
        for (next, length) in graph.neighbors(node) {
            let candidate = d + u64::from(length);
            if candidate < dist[next.index()] {
                dist[next.index()] = candidate;
                prev[next.index()] = Some(node);
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    if dist[end.index()] == u64::MAX {
        return Vec::new();
    }

    let mut path = vec![end];
    let mut current = end;
    while let Some(p) = prev[current.index()] {
        path.push(p);
        current = p;
    }
    path.reverse();
    path
}

/// Shortest distance from `start` to every node, `None` where unreachable.
pub fn distances_from(graph: &WorldGraph, start: NodeId) -> Vec<Option<u64>> {
    let mut dist = vec![None; graph.node_count()];
    if !graph.contains(start) {
        return dist;
    }
    let mut heap = BinaryHeap::new();
    dist[start.index()] = Some(0);
    heap.push(Reverse((0u64, start)));

    while let Some(Reverse((d, node))) = heap.pop() {
        if dist[node.index()].is_some_and(|best| d > best) {
            continue;
        }
        for (next, length) in graph.neighbors(node) {
            let candidate = d + u64::from(length);
            if dist[next.index()].is_none_or(|best| candidate < best) {
                dist[next.index()] = Some(candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }
    dist
}

/// Sum of the edge lengths along `path`.
///
/// Empty and single-node paths weigh 0. Consecutive nodes that are not
/// adjacent are an error.
pub fn path_weight(graph: &WorldGraph, path: &[NodeId]) -> Result<u32, GraphError> {
    let mut total = 0u32;
    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let edge = graph
            .edge_between(a, b)
            .and_then(|eid| graph.edge(eid))
            .ok_or(GraphError::NotAdjacent(a, b))?;
        total = total.saturating_add(edge.length);
    }
    Ok(total)
}
