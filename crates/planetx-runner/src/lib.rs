//! Planet X Runner -- drives missions on threads and manages games.
//!
//! A started game runs on two threads sharing one
//! [`Mission`](planetx_core::mission::Mission):
//!
//! 1. **Solver** -- calls the [`Spaceship`](planetx_core::phase::Spaceship)'s
//!    `search` and `rescue` in turn, bracketed by the mission's phase
//!    transitions.
//! 2. **Clock** -- calls `advance` on a [`clock::TickSchedule`] until the
//!    solver returns, the run fails or the game is stopped.
//!
//! Lifecycle events reach a [`observer::MissionObserver`]; a failure is
//! reported at most once no matter which thread detects it.
//!
//! # Key Types
//!
//! - [`controller::Controller`] -- New game, reset, start, kill.
//! - [`run::ActiveRun`] -- The two threads of one started game.
//! - [`reference::ReferenceSpaceship`] -- A baseline solver.
//! - [`benchmark::run_benchmark`] -- Many seeds, one report.

pub mod benchmark;
pub mod clock;
pub mod controller;
pub mod error;
pub mod observer;
pub mod reference;
pub mod run;

pub use controller::{Controller, ShipFactory};
pub use error::RunnerError;
pub use run::RunOutcome;
