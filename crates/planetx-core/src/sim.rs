//! Mutable state of one run and the rules that advance it.
//!
//! [`RunState`] is plain data with no locking. [`crate::mission::Mission`]
//! owns one behind a mutex and is the only thing that mutates it, either
//! from the clock (`advance`) or from the solver (`depart`).

use crate::config::{FuelBudget, MissionRules};
use crate::error::{MissionError, SolutionFailure};
use crate::fixed::{Fixed64, fixed64_to_f64, round_half_up, tick_distance};
use crate::graph::{Point, WorldGraph};
use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

pub const FUEL_FAILURE: &str = "ran out of fuel and can no longer travel";
pub const SEARCH_WRONG_LOCATION: &str = "search returned at the wrong location";
pub const RESCUE_WRONG_LOCATION: &str = "rescue returned at the wrong location";

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// The phase a run is in. Runs go None, Search, None, Rescue, None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    None,
    Search,
    Rescue,
}

/// Lifecycle of one phase. Each phase begins once and ends once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Pending,
    Active,
    Ended { succeeded: bool },
}

impl Stage {
    pub fn succeeded(self) -> bool {
        matches!(self, Stage::Ended { succeeded: true })
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was moving (or the run was aborted).
    Idle,
    /// The ship moved along its edge without arriving.
    Moving,
    /// The ship arrived at this node during the tick.
    Arrived(NodeId),
}

/// The edge the ship is currently traversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flight {
    pub edge: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub length: u32,
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunState {
    search: Stage,
    rescue: Stage,
    ship_node: NodeId,
    position: Point,
    flight: Option<Flight>,
    /// Fraction of the current edge covered, in `[0, 1]` while in flight.
    lerp: Fixed64,
    /// Distance covered on the current edge, rounded.
    edge_distance: u32,
    fuel_used: u64,
    fuel_remaining: i64,
    rewards_remaining: Vec<u32>,
    rewards_collected: u64,
    score: i64,
    failure: Option<String>,
    aborted: bool,
    edge_visits: SecondaryMap<EdgeId, u32>,
    ticks: u64,
}

impl RunState {
    pub fn new(world: &WorldGraph) -> Self {
        let origin = world.origin();
        let position = world
            .node(origin)
            .map(|n| Point::from(n.position))
            .unwrap_or_default();
        Self {
            search: Stage::Pending,
            rescue: Stage::Pending,
            ship_node: origin,
            position,
            flight: None,
            lerp: Fixed64::ZERO,
            edge_distance: 0,
            fuel_used: 0,
            fuel_remaining: 0,
            rewards_remaining: world.nodes().iter().map(|n| n.reward).collect(),
            rewards_collected: 0,
            score: 0,
            failure: None,
            aborted: false,
            edge_visits: SecondaryMap::new(),
            ticks: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        if self.search == Stage::Active {
            Phase::Search
        } else if self.rescue == Stage::Active {
            Phase::Rescue
        } else {
            Phase::None
        }
    }

    pub fn search_stage(&self) -> Stage {
        self.search
    }

    pub fn rescue_stage(&self) -> Stage {
        self.rescue
    }

    pub fn ship_node(&self) -> NodeId {
        self.ship_node
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn flight(&self) -> Option<Flight> {
        self.flight
    }

    pub fn in_flight(&self) -> bool {
        self.flight.is_some()
    }

    /// Score as displayed: in search, includes the distance covered on the
    /// current edge, floored at zero.
    pub fn score(&self) -> i64 {
        if self.phase() == Phase::Search {
            (self.score - i64::from(self.edge_distance)).max(0)
        } else {
            self.score
        }
    }

    /// Fuel used including partial progress on the current edge.
    pub fn fuel_used(&self) -> u64 {
        self.fuel_used + u64::from(self.edge_distance)
    }

    /// Fuel remaining including partial progress on the current edge.
    pub fn fuel_remaining(&self) -> i64 {
        if self.phase() == Phase::Rescue {
            self.fuel_remaining - i64::from(self.edge_distance)
        } else {
            self.fuel_remaining
        }
    }

    /// Rewards taken in rescue. An arrival that runs out of fuel takes none.
    pub fn rewards_collected(&self) -> u64 {
        self.rewards_collected
    }

    /// Reward still available at `node`.
    pub fn reward_at(&self, node: NodeId) -> u32 {
        self.rewards_remaining.get(node.index()).copied().unwrap_or(0)
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn edge_visits(&self) -> &SecondaryMap<EdgeId, u32> {
        &self.edge_visits
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // -----------------------------------------------------------------------
    // Phase transitions
    // -----------------------------------------------------------------------

    pub fn begin_search(&mut self, world: &WorldGraph) -> Result<(), MissionError> {
        let phase = self.phase();
        if phase != Phase::None {
            return Err(MissionError::InvalidPhase {
                operation: "begin search",
                actual: phase,
            });
        }
        if self.search != Stage::Pending {
            return Err(MissionError::AlreadyDone {
                operation: "begin search",
            });
        }
        self.search = Stage::Active;
        self.score = 2 * i64::from(world.origin_to_target());
        Ok(())
    }

    pub fn end_search(&mut self, world: &WorldGraph) -> Result<bool, MissionError> {
        let phase = self.phase();
        if phase != Phase::Search {
            return Err(MissionError::InvalidPhase {
                operation: "end search",
                actual: phase,
            });
        }
        let at_target = self.ship_node == world.target();
        if !at_target {
            self.record_failure(SEARCH_WRONG_LOCATION);
        }
        let succeeded = at_target && self.failure.is_none();
        if !succeeded {
            self.score = 0;
        }
        self.search = Stage::Ended { succeeded };
        Ok(succeeded)
    }

    pub fn begin_rescue(
        &mut self,
        world: &WorldGraph,
        rules: &MissionRules,
    ) -> Result<(), MissionError> {
        let phase = self.phase();
        if phase != Phase::None || !matches!(self.search, Stage::Ended { .. }) {
            return Err(MissionError::InvalidPhase {
                operation: "begin rescue",
                actual: phase,
            });
        }
        if self.rescue != Stage::Pending {
            return Err(MissionError::AlreadyDone {
                operation: "begin rescue",
            });
        }
        self.rescue = Stage::Active;
        self.fuel_remaining = match rules.fuel_budget {
            FuelBudget::Derived => {
                i64::from(world.edge_sum() / 2) + i64::from(world.origin_to_target())
            }
            FuelBudget::Fixed(fuel) => fuel,
        };
        Ok(())
    }

    pub fn end_rescue(&mut self, world: &WorldGraph) -> Result<bool, MissionError> {
        let phase = self.phase();
        if phase != Phase::Rescue {
            return Err(MissionError::InvalidPhase {
                operation: "end rescue",
                actual: phase,
            });
        }
        let at_home = self.ship_node == world.origin();
        if !at_home {
            self.record_failure(RESCUE_WRONG_LOCATION);
        }
        let succeeded = at_home && self.failure.is_none();
        if !succeeded {
            self.score = 0;
        }
        self.rescue = Stage::Ended { succeeded };
        Ok(succeeded)
    }

    // -----------------------------------------------------------------------
    // Failure and abort
    // -----------------------------------------------------------------------

    /// Record the run's failure. The first reason wins; returns whether this
    /// call was the one that set it.
    pub fn record_failure(&mut self, reason: impl Into<String>) -> bool {
        if self.failure.is_some() {
            return false;
        }
        self.failure = Some(reason.into());
        self.score = 0;
        true
    }

    /// Set the abort flag, settling the ship at its destination if it is
    /// moving. Returns whether a flight was cut short.
    pub fn abort(&mut self, world: &WorldGraph) -> bool {
        self.aborted = true;
        if self.flight.is_some() {
            self.arrive(world);
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Motion
    // -----------------------------------------------------------------------

    /// Put the ship on `edge` toward `to`. The caller has checked adjacency.
    pub fn depart(&mut self, edge: EdgeId, to: NodeId, length: u32) {
        self.flight = Some(Flight {
            edge,
            from: self.ship_node,
            to,
            length: length.max(1),
        });
        self.lerp = Fixed64::ZERO;
        self.edge_distance = 0;
        match self.edge_visits.get_mut(edge) {
            Some(count) => *count += 1,
            None => {
                self.edge_visits.insert(edge, 1);
            }
        }
    }

    /// Place the ship on `node` without travelling. Refused mid-flight.
    pub fn place(&mut self, world: &WorldGraph, node: NodeId) -> Result<(), MissionError> {
        if self.flight.is_some() {
            return Err(MissionError::InFlight);
        }
        let n = world.node(node).ok_or(MissionError::UnknownNode(node))?;
        self.ship_node = node;
        self.position = Point::from(n.position);
        Ok(())
    }

    /// Advance the clock by `tick_ms` milliseconds.
    ///
    /// A recorded failure is returned again without advancing. After abort
    /// this is a no-op. In rescue, the first tick on which reported fuel goes
    /// negative records the fuel failure and returns it.
    pub fn advance(
        &mut self,
        world: &WorldGraph,
        rules: &MissionRules,
        tick_ms: u32,
    ) -> Result<TickOutcome, SolutionFailure> {
        if self.aborted {
            return Ok(TickOutcome::Idle);
        }
        if let Some(reason) = &self.failure {
            return Err(SolutionFailure::new(reason.clone()));
        }
        self.ticks += 1;

        let Some(flight) = self.flight else {
            return Ok(TickOutcome::Idle);
        };

        let length = Fixed64::from_num(flight.length);
        self.lerp += tick_distance(rules.base_speed, tick_ms) / length;
        let outcome = if self.lerp > Fixed64::ONE {
            self.arrive(world);
            TickOutcome::Arrived(flight.to)
        } else {
            self.edge_distance = round_half_up(self.lerp * length);
            self.interpolate(world, flight);
            TickOutcome::Moving
        };

        if self.phase() == Phase::Rescue && self.fuel_remaining() < 0 {
            self.record_failure(FUEL_FAILURE);
            return Err(SolutionFailure::new(FUEL_FAILURE));
        }
        Ok(outcome)
    }

    fn interpolate(&mut self, world: &WorldGraph, flight: Flight) {
        let (Some(a), Some(b)) = (world.node(flight.from), world.node(flight.to)) else {
            return;
        };
        let t = fixed64_to_f64(self.lerp);
        let (a, b) = (Point::from(a.position), Point::from(b.position));
        self.position = Point {
            x: (1.0 - t) * a.x + t * b.x,
            y: (1.0 - t) * a.y + t * b.y,
        };
    }

    /// Finish the current flight: settle on the destination, commit the
    /// edge's distance and collect any rescue reward there.
    fn arrive(&mut self, world: &WorldGraph) {
        let Some(flight) = self.flight.take() else {
            return;
        };
        self.ship_node = flight.to;
        if let Some(n) = world.node(flight.to) {
            self.position = Point::from(n.position);
        }
        self.lerp = Fixed64::ZERO;
        self.edge_distance = 0;
        self.fuel_used += u64::from(flight.length);

        match self.phase() {
            Phase::Search => {
                self.score = (self.score - i64::from(flight.length)).max(0);
            }
            Phase::Rescue => {
                self.fuel_remaining -= i64::from(flight.length);
                // An arrival that exhausts the fuel fails the run untouched.
                if self.fuel_remaining >= 0 {
                    self.collect_reward(flight.to);
                }
            }
            Phase::None => {}
        }
    }

    fn collect_reward(&mut self, node: NodeId) {
        let Some(slot) = self.rewards_remaining.get_mut(node.index()) else {
            return;
        };
        let reward = std::mem::take(slot);
        self.rewards_collected += u64::from(reward);
        if self.failure.is_none() {
            self.score += i64::from(reward);
        }
    }
}
