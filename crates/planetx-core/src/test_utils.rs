//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::graph::{Position, WorldGraph};
use crate::mission::Mission;
use crate::names::NamePool;
use std::thread;

// ===========================================================================
// Hand-built worlds
// ===========================================================================

/// Three nodes in a line, seed 42: A(0,0) - B(10,0) - C(25,0).
///
/// Edge lengths 10 and 15, no rewards, origin A, target C.
pub fn linear_world() -> WorldGraph {
    let mut b = WorldGraph::builder().seed(42).size(30, 10);
    let a = b.add_node("A", Position::new(0, 0), 0);
    let bb = b.add_node("B", Position::new(10, 0), 0);
    let c = b.add_node("C", Position::new(25, 0), 0);
    b.connect(a, bb);
    b.connect(bb, c);
    b.origin(a).target(c);
    b.build().expect("linear world is valid")
}

/// The linear world plus a separate pair D(100,100) - E(110,100).
///
/// Nodes 3 and 4 are unreachable from the origin.
pub fn two_component_world() -> WorldGraph {
    let mut b = WorldGraph::builder().seed(7).size(120, 120);
    let a = b.add_node("A", Position::new(0, 0), 0);
    let bb = b.add_node("B", Position::new(10, 0), 0);
    let c = b.add_node("C", Position::new(25, 0), 0);
    let d = b.add_node("D", Position::new(100, 100), 3);
    let e = b.add_node("E", Position::new(110, 100), 4);
    b.connect(a, bb);
    b.connect(bb, c);
    b.connect(d, e);
    b.origin(a).target(c);
    b.build().expect("two-component world is valid")
}

/// A pool of `n` distinct generated names.
pub fn numbered_names(n: usize) -> NamePool {
    NamePool::from_names((0..n).map(|i| format!("Body {i}")))
}

// ===========================================================================
// Driving a mission
// ===========================================================================

/// Run `solver` on its own thread while ticking `mission` from this one
/// until the solver returns.
///
/// A failed tick aborts the run so a parked solver is released.
pub fn drive<F, R>(mission: &Mission, tick_ms: u32, solver: F) -> R
where
    F: FnOnce(&Mission) -> R + Send,
    R: Send,
{
    thread::scope(|s| {
        let handle = s.spawn(|| solver(mission));
        while !handle.is_finished() {
            if mission.advance(tick_ms).is_err() {
                mission.abort();
            }
            thread::yield_now();
        }
        handle.join().expect("solver thread panicked")
    })
}
