//! Scenario tests for the mission: a solver thread drives the ship through
//! the phase views while the test thread plays the clock.

use planetx_core::config::{FuelBudget, MissionRules};
use planetx_core::error::{Abort, MissionError, SolutionFailure};
use planetx_core::graph::{Position, WorldGraph};
use planetx_core::id::NodeId;
use planetx_core::mission::Mission;
use planetx_core::paths::{path_weight, shortest_path};
use planetx_core::sim::{FUEL_FAILURE, Phase};
use planetx_core::test_utils::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const A: NodeId = NodeId(0);
const B: NodeId = NodeId(1);
const C: NodeId = NodeId(2);

fn linear_mission(rules: MissionRules) -> Mission {
    Mission::new(Arc::new(linear_world()), rules)
}

/// Run the search phase from A to C and end it.
fn search_to_target(mission: &Mission) {
    let moved = drive(mission, 16, |m| {
        let search = m.begin_search().unwrap();
        search.move_to(B)?;
        search.move_to(C)?;
        assert!(search.at_target());
        Ok::<_, Abort>(())
    });
    assert_eq!(moved, Ok(()));
    assert!(mission.end_search().unwrap());
}

// ===========================================================================
// Small deterministic world
// ===========================================================================

#[test]
fn linear_search_succeeds_with_distance_25() {
    let mission = linear_mission(MissionRules::default());
    assert_eq!(mission.world().seed(), 42);

    search_to_target(&mission);

    assert!(mission.search_succeeded());
    assert_eq!(mission.fuel_used(), 25);
    // Budget 2 * 25 minus the 25 flown.
    assert_eq!(mission.score(), 25);

    let path = shortest_path(mission.world(), A, C);
    assert_eq!(path, vec![A, B, C]);
    assert_eq!(path_weight(mission.world(), &path).unwrap(), 25);
}

#[test]
fn full_run_returns_home() {
    let mission = linear_mission(MissionRules::default());
    search_to_target(&mission);

    let result = drive(&mission, 16, |m| {
        let rescue = m.begin_rescue().unwrap();
        assert_eq!(rescue.fuel_remaining(), 37);
        let route = shortest_path(rescue.world(), rescue.current_id(), rescue.home().id);
        for &step in &route[1..] {
            rescue.move_to(step)?;
        }
        Ok::<_, Abort>(rescue.fuel_remaining())
    });
    assert_eq!(result, Ok(12));
    assert!(mission.end_rescue().unwrap());
    assert!(mission.rescue_succeeded());
    assert_eq!(mission.phase(), Phase::None);
    assert_eq!(mission.score(), 25);
}

// ===========================================================================
// Fuel exhaustion
// ===========================================================================

#[test]
fn fuel_exhaustion_fails_and_cancels_solver() {
    // 12 units of fuel cannot cover the 15-unit edge from C back to B.
    let mission = linear_mission(MissionRules {
        fuel_budget: FuelBudget::Fixed(12),
        ..MissionRules::default()
    });
    search_to_target(&mission);

    let result = drive(&mission, 16, |m| {
        let rescue = m.begin_rescue().unwrap();
        rescue.move_to(B)?;
        rescue.move_to(A)?;
        Ok::<_, Abort>(())
    });

    assert_eq!(result, Err(Abort));
    let failure = mission.failure().expect("run should have failed");
    assert!(failure.reason.contains("fuel"));
    assert_eq!(failure, SolutionFailure::new(FUEL_FAILURE));
    assert_eq!(mission.score(), 0);
    assert!(mission.fuel_remaining() < 0);
    assert!(!mission.end_rescue().unwrap());
}

#[test]
fn fuel_never_increases_during_rescue() {
    let mission = linear_mission(MissionRules::default());
    search_to_target(&mission);
    let rescue = mission.begin_rescue().unwrap();

    let readings = thread::scope(|s| {
        let mover = s.spawn(|| rescue.move_to(B));
        let mut readings = vec![mission.fuel_remaining()];
        while !mover.is_finished() {
            mission.advance(16).unwrap();
            readings.push(mission.fuel_remaining());
        }
        assert_eq!(mover.join().unwrap(), Ok(()));
        readings
    });

    assert!(readings.windows(2).all(|w| w[1] <= w[0]), "{readings:?}");
    assert_eq!(readings[0], 37);
    assert_eq!(mission.fuel_remaining(), 37 - 15);
}

// ===========================================================================
// Invalid moves and abort
// ===========================================================================

#[test]
fn invalid_move_parks_then_aborts() {
    let mission = linear_mission(MissionRules::default());
    let result = thread::scope(|s| {
        let solver = s.spawn(|| {
            let search = mission.begin_search().unwrap();
            let first = search.move_to(C);
            // Never reached before abort: the next call must also cancel.
            let second = search.move_to(B);
            (first, second)
        });
        while mission.failure().is_none() {
            mission.advance(16).ok();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!solver.is_finished());
        mission.abort();
        solver.join().unwrap()
    });

    assert_eq!(result, (Err(Abort), Err(Abort)));
    assert_eq!(mission.ship_node(), A);
    assert!(
        mission
            .failure()
            .unwrap()
            .reason
            .contains("non-adjacent")
    );
}

#[test]
fn abort_in_flight_settles_at_destination() {
    let mission = linear_mission(MissionRules::default());
    let result = thread::scope(|s| {
        let solver = s.spawn(|| {
            let search = mission.begin_search().unwrap();
            search.move_to(B)
        });
        while !mission.in_flight() {
            thread::sleep(Duration::from_millis(1));
        }
        mission.advance(16).unwrap();
        mission.abort();
        solver.join().unwrap()
    });

    assert_eq!(result, Err(Abort));
    assert_eq!(mission.ship_node(), B);
    assert!(!mission.in_flight());
    let snap = mission.snapshot();
    assert!(snap.aborted);
    assert_eq!(snap.ship_position.x, 10.0);
}

#[test]
fn reward_collected_once_per_node() {
    let mut b = WorldGraph::builder();
    let home = b.add_node("Earth", Position::new(0, 0), 0);
    let cache = b.add_node("Cache", Position::new(10, 0), 25);
    let x = b.add_node("Planet X", Position::new(20, 0), 0);
    b.connect(home, cache);
    b.connect(cache, x);
    b.origin(home).target(x);
    let mission = Mission::new(
        Arc::new(b.build().unwrap()),
        MissionRules {
            fuel_budget: FuelBudget::Fixed(1_000),
            ..MissionRules::default()
        },
    );

    mission.begin_search().unwrap();
    mission.set_ship_node(x).unwrap();
    mission.end_search().unwrap();

    let result = drive(&mission, 16, |m| {
        let rescue = m.begin_rescue().unwrap();
        rescue.move_to(cache)?;
        let first = m.rewards_collected();
        rescue.move_to(x)?;
        rescue.move_to(cache)?;
        rescue.move_to(home)?;
        Ok::<_, Abort>(first)
    });

    assert_eq!(result, Ok(25));
    assert_eq!(mission.rewards_collected(), 25);
    assert_eq!(mission.reward_at(cache), 0);
}

// ===========================================================================
// Phase misuse
// ===========================================================================

#[test]
fn phase_misuse_is_reported() {
    let mission = linear_mission(MissionRules::default());
    assert!(matches!(
        mission.end_search(),
        Err(MissionError::InvalidPhase { .. })
    ));
    assert!(matches!(
        mission.begin_rescue(),
        Err(MissionError::InvalidPhase { .. })
    ));
    mission.begin_search().unwrap();
    assert!(matches!(
        mission.begin_search(),
        Err(MissionError::InvalidPhase { actual: Phase::Search, .. })
    ));
    assert_eq!(mission.phase(), Phase::Search);
}
