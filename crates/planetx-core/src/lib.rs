//! Planet X Core -- world generation and the concurrent mission model.
//!
//! A run takes place on a [`graph::WorldGraph`] built once from a seed by
//! [`generate::generate`]. A [`mission::Mission`] wraps the world with the
//! mutable run state, and three actors share it:
//!
//! 1. **Clock** -- calls [`mission::Mission::advance`] at a fixed cadence to
//!    move the ship along its edge and enforce the fuel and score rules.
//! 2. **Solver** -- a [`phase::Spaceship`] driving the ship through the
//!    phase-scoped views [`phase::SearchPhase`] and [`phase::RescuePhase`].
//!    Its `move_to` calls block until the clock completes the move.
//! 3. **Controller** -- may [`mission::Mission::abort`] at any time, which
//!    cancels every blocked or future movement request.
//!
//! # Phases
//!
//! ```text
//! None -> Search -> None -> Rescue -> None
//! ```
//!
//! Search starts with a score budget of twice the origin-to-target distance
//! and loses the distance flown. Rescue starts with a fuel budget, collects
//! rewards on arrival, and fails the run if fuel runs out.
//!
//! # Key Types
//!
//! - [`graph::WorldGraph`] -- Nodes, undirected weighted edges, origin,
//!   target and the signal field.
//! - [`paths::shortest_path`] -- Dijkstra over the world graph.
//! - [`triangulate::Triangulator`] -- Seam for the planar triangulation the
//!   generator starts from.
//! - [`sim::RunState`] -- Lock-free state machine advanced by the mission.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic motion.
//! - [`rng::SimRng`] -- SplitMix64 generator behind every random draw.

pub mod config;
pub mod error;
pub mod fixed;
pub mod generate;
pub mod graph;
pub mod id;
pub mod mission;
pub mod names;
pub mod paths;
pub mod phase;
pub mod query;
pub mod rng;
pub mod sim;
pub mod triangulate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
