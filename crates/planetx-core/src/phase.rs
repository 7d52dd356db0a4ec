//! Phase-scoped capability views handed to a solver.
//!
//! Each view wraps the one [`Mission`] and exposes only its phase's
//! operations. Reads take the lock briefly and never wait; only `move_to`
//! blocks.

use crate::error::{Abort, SolveError};
use crate::graph::{Position, WorldGraph};
use crate::id::NodeId;
use crate::mission::Mission;
use serde::Serialize;
use std::cmp::Ordering;

/// A neighbor of the ship's node as seen during search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborStatus {
    pub id: NodeId,
    pub name: String,
    pub signal: f64,
}

/// A node as seen during rescue, with its remaining reward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub position: Position,
    pub reward: u32,
    /// Adjacent nodes with the connecting edge length.
    pub neighbors: Vec<(NodeId, u32)>,
}

/// A solving algorithm, run once per phase on its own thread.
pub trait Spaceship: Send {
    /// Find the target using only local signal readings.
    fn search(&mut self, phase: &SearchPhase<'_>) -> Result<(), SolveError>;

    /// Return to the origin, collecting rewards, within the fuel budget.
    fn rescue(&mut self, phase: &RescuePhase<'_>) -> Result<(), SolveError>;
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct SearchPhase<'a> {
    mission: &'a Mission,
}

impl<'a> SearchPhase<'a> {
    pub(crate) fn new(mission: &'a Mission) -> Self {
        Self { mission }
    }

    pub fn current_id(&self) -> NodeId {
        self.mission.ship_node()
    }

    /// Signal strength at the ship's node.
    pub fn signal(&self) -> f64 {
        self.mission.world().signal(self.current_id())
    }

    /// Neighbors of the ship's node, strongest signal first, ties by id.
    pub fn neighbors(&self) -> Vec<NeighborStatus> {
        let world = self.mission.world();
        let mut out: Vec<NeighborStatus> = world
            .neighbors(self.current_id())
            .filter_map(|(id, _)| {
                let node = world.node(id)?;
                Some(NeighborStatus {
                    id,
                    name: node.name.clone(),
                    signal: world.signal(id),
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.signal
                .partial_cmp(&a.signal)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        out
    }

    pub fn at_target(&self) -> bool {
        self.current_id() == self.mission.world().target()
    }

    /// Fly to the neighbor `id`, returning once the ship has arrived.
    pub fn move_to(&self, id: NodeId) -> Result<(), Abort> {
        self.mission.move_to(id)
    }
}

// ---------------------------------------------------------------------------
// Rescue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RescuePhase<'a> {
    mission: &'a Mission,
}

impl<'a> RescuePhase<'a> {
    pub(crate) fn new(mission: &'a Mission) -> Self {
        Self { mission }
    }

    /// The full map, for path planning.
    pub fn world(&self) -> &WorldGraph {
        self.mission.world()
    }

    pub fn current_id(&self) -> NodeId {
        self.mission.ship_node()
    }

    pub fn current_node(&self) -> NodeView {
        let id = self.current_id();
        self.view(id)
    }

    /// The node the ship must return to.
    pub fn home(&self) -> NodeView {
        self.view(self.mission.world().origin())
    }

    /// Every node of the map.
    pub fn nodes(&self) -> Vec<NodeView> {
        let world = self.mission.world();
        self.mission.with_state(|state| {
            world
                .nodes()
                .iter()
                .map(|n| NodeView {
                    id: n.id,
                    name: n.name.clone(),
                    position: n.position,
                    reward: state.reward_at(n.id),
                    neighbors: world.neighbors(n.id).collect(),
                })
                .collect()
        })
    }

    /// Remaining reward at `id`.
    pub fn reward_at(&self, id: NodeId) -> u32 {
        self.mission.reward_at(id)
    }

    pub fn fuel_remaining(&self) -> i64 {
        self.mission.fuel_remaining()
    }

    /// Fly to the adjacent node `id`, returning once the ship has arrived.
    pub fn move_to(&self, id: NodeId) -> Result<(), Abort> {
        self.mission.move_to(id)
    }

    fn view(&self, id: NodeId) -> NodeView {
        let world = self.mission.world();
        let reward = self.mission.reward_at(id);
        match world.node(id) {
            Some(n) => NodeView {
                id,
                name: n.name.clone(),
                position: n.position,
                reward,
                neighbors: world.neighbors(id).collect(),
            },
            None => NodeView {
                id,
                name: String::new(),
                position: Position::new(0, 0),
                reward: 0,
                neighbors: Vec::new(),
            },
        }
    }
}
