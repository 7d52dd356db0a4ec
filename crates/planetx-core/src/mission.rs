//! The shared, lock-protected run that the clock, the solver and the
//! controller all act on.
//!
//! # Concurrency
//!
//! All run state sits behind one mutex. A movement request departs under the
//! lock and then waits on the `settled` condition variable, which releases the
//! lock while suspended. Clock ticks take the same lock; the tick that
//! completes a flight broadcasts `settled`. Abort is cooperative: it sets a
//! sticky flag, settles any flight at its destination and broadcasts, and
//! every waiter that wakes to find the flag set returns [`Abort`].
//!
//! A movement request after a failure, or one that names a non-adjacent
//! node, does not return an error to the solver. It parks until abort and
//! then returns [`Abort`], so solver code never runs on past a dead run.
//!
//! Poisoned locks are recovered: every critical section leaves the state
//! consistent before it can panic.

use crate::config::MissionRules;
use crate::error::{Abort, MissionError, SolutionFailure};
use crate::graph::{Point, WorldGraph};
use crate::id::NodeId;
use crate::phase::{RescuePhase, SearchPhase};
use crate::query::MissionSnapshot;
use crate::sim::{Phase, RunState, TickOutcome};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

pub struct Mission {
    world: Arc<WorldGraph>,
    rules: MissionRules,
    state: Mutex<RunState>,
    settled: Condvar,
}

impl std::fmt::Debug for Mission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mission")
            .field("seed", &self.world.seed())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Mission {
    pub fn new(world: Arc<WorldGraph>, rules: MissionRules) -> Self {
        let state = RunState::new(&world);
        Self {
            world,
            rules,
            state: Mutex::new(state),
            settled: Condvar::new(),
        }
    }

    pub fn world(&self) -> &Arc<WorldGraph> {
        &self.world
    }

    pub fn rules(&self) -> &MissionRules {
        &self.rules
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, RunState>) -> MutexGuard<'a, RunState> {
        self.settled
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Phase lifecycle
    // -----------------------------------------------------------------------

    /// Enter the search phase and hand out its capability view.
    pub fn begin_search(&self) -> Result<SearchPhase<'_>, MissionError> {
        self.lock().begin_search(&self.world)?;
        tracing::info!(
            budget = 2 * u64::from(self.world.origin_to_target()),
            "search phase began"
        );
        Ok(SearchPhase::new(self))
    }

    /// Leave the search phase. Returns whether the ship ended on the target.
    pub fn end_search(&self) -> Result<bool, MissionError> {
        let succeeded = self.lock().end_search(&self.world)?;
        tracing::info!(succeeded, "search phase ended");
        Ok(succeeded)
    }

    /// Enter the rescue phase and hand out its capability view.
    pub fn begin_rescue(&self) -> Result<RescuePhase<'_>, MissionError> {
        let fuel = {
            let mut state = self.lock();
            state.begin_rescue(&self.world, &self.rules)?;
            state.fuel_remaining()
        };
        tracing::info!(fuel, "rescue phase began");
        Ok(RescuePhase::new(self))
    }

    /// Leave the rescue phase. Returns whether the ship ended at home.
    pub fn end_rescue(&self) -> Result<bool, MissionError> {
        let (succeeded, score) = {
            let mut state = self.lock();
            let succeeded = state.end_rescue(&self.world)?;
            (succeeded, state.score())
        };
        tracing::info!(succeeded, score, "rescue phase ended");
        Ok(succeeded)
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    /// Advance the run by one tick of `tick_ms` milliseconds.
    ///
    /// Wakes a waiting movement request when its flight completes. A failure
    /// found during the tick, or recorded earlier, is returned.
    pub fn advance(&self, tick_ms: u32) -> Result<TickOutcome, SolutionFailure> {
        let result = self.lock().advance(&self.world, &self.rules, tick_ms);
        if let Ok(TickOutcome::Arrived(node)) = result {
            tracing::debug!(node = %node, "ship arrived");
            self.settled.notify_all();
        }
        result
    }

    // -----------------------------------------------------------------------
    // Failure and abort
    // -----------------------------------------------------------------------

    /// Abort the run. Settles any flight at its destination and wakes every
    /// waiter. Idempotent.
    pub fn abort(&self) {
        let cut_short = {
            let mut state = self.lock();
            if state.is_aborted() {
                return;
            }
            state.abort(&self.world)
        };
        tracing::info!(cut_short, "run aborted");
        self.settled.notify_all();
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().is_aborted()
    }

    /// Record a failure for the run. The first reason wins; returns whether
    /// this call set it.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let first = self.lock().record_failure(reason.clone());
        if first {
            tracing::warn!(%reason, "run failed");
        }
        first
    }

    pub fn failure(&self) -> Option<SolutionFailure> {
        self.lock().failure().map(SolutionFailure::new)
    }

    // -----------------------------------------------------------------------
    // Presentation reads
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub fn score(&self) -> i64 {
        self.lock().score()
    }

    pub fn rewards_collected(&self) -> u64 {
        self.lock().rewards_collected()
    }

    pub fn fuel_used(&self) -> u64 {
        self.lock().fuel_used()
    }

    pub fn fuel_remaining(&self) -> i64 {
        self.lock().fuel_remaining()
    }

    pub fn ship_node(&self) -> NodeId {
        self.lock().ship_node()
    }

    pub fn ship_position(&self) -> Point {
        self.lock().position()
    }

    pub fn in_flight(&self) -> bool {
        self.lock().in_flight()
    }

    pub fn search_succeeded(&self) -> bool {
        self.lock().search_stage().succeeded()
    }

    pub fn rescue_succeeded(&self) -> bool {
        self.lock().rescue_stage().succeeded()
    }

    /// Remaining reward at `node`.
    pub fn reward_at(&self, node: NodeId) -> u32 {
        self.lock().reward_at(node)
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot::capture(&self.world, &self.lock())
    }

    /// Put the ship on `node` directly. For harness setup; refused while the
    /// ship is moving.
    pub fn set_ship_node(&self, node: NodeId) -> Result<(), MissionError> {
        self.lock().place(&self.world, node)
    }

    /// Run `f` with the state locked.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&RunState) -> R) -> R {
        f(&self.lock())
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Move the ship to the adjacent node `to`, returning once it has
    /// arrived.
    pub(crate) fn move_to(&self, to: NodeId) -> Result<(), Abort> {
        let mut state = self.lock();
        if state.is_aborted() {
            return Err(Abort);
        }
        if state.failure().is_some() {
            return Err(self.park_until_abort(state));
        }
        while state.in_flight() && !state.is_aborted() {
            state = self.wait(state);
        }

        let from = state.ship_node();
        let Some((edge, length)) = self
            .world
            .edge_between(from, to)
            .and_then(|eid| Some((eid, self.world.edge(eid)?.length)))
        else {
            let reason = format!("tried to move from {from} to non-adjacent node {to}");
            if state.record_failure(reason.as_str()) {
                tracing::warn!(%reason, "run failed");
            }
            return Err(self.park_until_abort(state));
        };

        state.depart(edge, to, length);
        tracing::debug!(from = %from, to = %to, length, "ship departed");
        while state.in_flight() && !state.is_aborted() {
            state = self.wait(state);
        }

        if state.is_aborted() {
            return Err(Abort);
        }
        if state.failure().is_some() {
            return Err(self.park_until_abort(state));
        }
        Ok(())
    }

    /// Block until the run is aborted.
    fn park_until_abort(&self, mut state: MutexGuard<'_, RunState>) -> Abort {
        while !state.is_aborted() {
            state = self.wait(state);
        }
        Abort
    }
}
