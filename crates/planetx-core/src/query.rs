use crate::graph::{Point, WorldGraph};
use crate::id::NodeId;
use crate::sim::{Phase, RunState, Stage};
use serde::Serialize;

/// How many times the ship has departed along one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeVisit {
    pub a: NodeId,
    pub b: NodeId,
    pub count: u32,
}

/// Read-only view of a run for presentation, taken under one lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSnapshot {
    pub seed: u64,
    pub phase: Phase,
    pub score: i64,
    pub rewards_collected: u64,
    pub fuel_used: u64,
    pub fuel_remaining: i64,
    pub ship_node: NodeId,
    pub ship_position: Point,
    /// `(from, to)` of the edge being traversed.
    pub in_flight: Option<(NodeId, NodeId)>,
    pub search: Stage,
    pub rescue: Stage,
    pub failure: Option<String>,
    pub aborted: bool,
    pub ticks: u64,
    /// Sorted by endpoints.
    pub edge_visits: Vec<EdgeVisit>,
}

impl MissionSnapshot {
    pub(crate) fn capture(world: &WorldGraph, state: &RunState) -> Self {
        let mut edge_visits: Vec<EdgeVisit> = state
            .edge_visits()
            .iter()
            .filter_map(|(eid, &count)| {
                let edge = world.edge(eid)?;
                Some(EdgeVisit {
                    a: edge.a.min(edge.b),
                    b: edge.a.max(edge.b),
                    count,
                })
            })
            .collect();
        edge_visits.sort_by_key(|v| (v.a, v.b));

        Self {
            seed: world.seed(),
            phase: state.phase(),
            score: state.score(),
            rewards_collected: state.rewards_collected(),
            fuel_used: state.fuel_used(),
            fuel_remaining: state.fuel_remaining(),
            ship_node: state.ship_node(),
            ship_position: state.position(),
            in_flight: state.flight().map(|f| (f.from, f.to)),
            search: state.search_stage(),
            rescue: state.rescue_stage(),
            failure: state.failure().map(str::to_owned),
            aborted: state.is_aborted(),
            ticks: state.ticks(),
            edge_visits,
        }
    }

    pub fn search_succeeded(&self) -> bool {
        self.search.succeeded()
    }

    pub fn rescue_succeeded(&self) -> bool {
        self.rescue.succeeded()
    }
}
