//! A straightforward solver used by the headless runner, the benchmark and
//! end-to-end tests.

use planetx_core::error::SolveError;
use planetx_core::id::NodeId;
use planetx_core::paths::{distances_from, shortest_path};
use planetx_core::phase::{RescuePhase, SearchPhase, Spaceship};
use std::collections::HashSet;

/// Greedy depth-first search by signal strength, then a fuel-safe walk home.
///
/// Search always moves to the unvisited neighbor with the strongest signal
/// and backtracks along its own trail when every neighbor has been seen.
/// Rescue takes a one-edge detour to a rewarded neighbor whenever the fuel
/// left afterwards still covers the shortest way home; otherwise it steps
/// along the shortest path home.
#[derive(Debug, Clone)]
pub struct ReferenceSpaceship {
    /// Collect rewards on the way home. Off walks the shortest path only.
    pub detours: bool,
}

impl Default for ReferenceSpaceship {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceSpaceship {
    pub fn new() -> Self {
        Self { detours: true }
    }

    /// Walks straight home without detours.
    pub fn direct() -> Self {
        Self { detours: false }
    }
}

impl Spaceship for ReferenceSpaceship {
    fn search(&mut self, phase: &SearchPhase<'_>) -> Result<(), SolveError> {
        let mut visited = HashSet::from([phase.current_id()]);
        let mut trail: Vec<NodeId> = Vec::new();

        while !phase.at_target() {
            let here = phase.current_id();
            let next = phase
                .neighbors()
                .into_iter()
                .find(|n| !visited.contains(&n.id));
            match next {
                Some(n) => {
                    trail.push(here);
                    visited.insert(n.id);
                    phase.move_to(n.id)?;
                }
                None => {
                    let back = trail.pop().ok_or_else(|| {
                        SolveError::Solver(format!(
                            "explored every reachable node from {here} without finding the target"
                        ))
                    })?;
                    phase.move_to(back)?;
                }
            }
        }
        Ok(())
    }

    fn rescue(&mut self, phase: &RescuePhase<'_>) -> Result<(), SolveError> {
        let world = phase.world();
        let home = phase.home().id;
        let to_home = distances_from(world, home);

        loop {
            let here = phase.current_id();
            if self.detours {
                let fuel = phase.fuel_remaining();
                let detour = world
                    .neighbors(here)
                    .filter(|&(n, _)| phase.reward_at(n) > 0)
                    .filter(|&(n, len)| {
                        to_home[n.index()]
                            .is_some_and(|d| i64::from(len) + d as i64 <= fuel)
                    })
                    .max_by_key(|&(n, len)| {
                        (phase.reward_at(n) / len.max(1), std::cmp::Reverse(n))
                    });
                if let Some((n, _)) = detour {
                    phase.move_to(n)?;
                    continue;
                }
            }

            if here == home {
                return Ok(());
            }
            let path = shortest_path(world, here, home);
            let step = path.get(1).copied().ok_or_else(|| {
                SolveError::Solver(format!("no route home from {here}"))
            })?;
            phase.move_to(step)?;
        }
    }
}
