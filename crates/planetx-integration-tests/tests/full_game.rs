//! Whole games across the data, core and runner crates: settings on disk,
//! generated worlds, the controller lifecycle and the reference solver.

use planetx_core::config::{ClockMode, RunConfig};
use planetx_core::generate::WorldConfig;
use planetx_core::names::{ORIGIN_NAME, TARGET_NAME};
use planetx_core::paths::{path_weight, shortest_path};
use planetx_data::{Settings, bundled_names, load_settings};
use planetx_runner::benchmark::run_benchmark;
use planetx_runner::observer::{ObservedEvent, QuietObserver, RecordingObserver};
use planetx_runner::reference::ReferenceSpaceship;
use planetx_runner::controller::ships_of;
use planetx_runner::{Controller, ShipFactory};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// Helpers
// ===========================================================================

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "planetx_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

fn reference_ships() -> ShipFactory {
    ships_of::<ReferenceSpaceship>()
}

fn small_world() -> WorldConfig {
    WorldConfig {
        width: 800,
        height: 800,
        min_nodes: 10,
        max_nodes: 60,
        ..WorldConfig::default()
    }
}

fn fast_run() -> RunConfig {
    RunConfig {
        clock: ClockMode::Unthrottled,
        speed: 16,
        ..RunConfig::default()
    }
}

/// The settings shipped with the data crate, shrunk to keep the test quick.
fn shipped_settings() -> Settings {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../planetx-data/data/settings.ron");
    let mut settings = load_settings(&path).unwrap();
    settings.world = small_world();
    settings.run.speed = 16;
    settings
}

// ===========================================================================
// Controller lifecycle
// ===========================================================================

#[test]
fn shipped_settings_play_a_full_game() {
    let rec = Arc::new(RecordingObserver::new());
    let mut c = Controller::from_settings(&shipped_settings(), reference_ships(), rec.clone())
        .unwrap();
    assert_eq!(c.seed(), 42);

    let world = c.world();
    let origin = world.node(world.origin()).unwrap();
    let target = world.node(world.target()).unwrap();
    assert_eq!(origin.name, ORIGIN_NAME);
    assert_eq!(target.name, TARGET_NAME);
    assert!(world.is_connected());

    c.start().unwrap();
    let outcome = c.wait().unwrap();
    assert!(outcome.succeeded(), "{outcome:?}");
    assert_eq!(rec.events().last(), Some(&ObservedEvent::GameEnded(outcome.score)));

    let snap = c.snapshot();
    assert_eq!(snap.ship_node, c.world().origin());
    assert!(snap.fuel_remaining >= 0);
    assert!(!snap.edge_visits.is_empty());
}

#[test]
fn reset_replays_the_same_game() {
    let mut c = Controller::new(
        small_world(),
        fast_run(),
        Arc::new(bundled_names()),
        reference_ships(),
        Arc::new(QuietObserver),
        2024,
    )
    .unwrap();
    c.start().unwrap();
    let first = c.wait().unwrap();

    c.reset().unwrap();
    c.start().unwrap();
    let second = c.wait().unwrap();

    assert_eq!(first, second);
    assert!(first.succeeded());
}

#[test]
fn search_score_is_bounded_by_the_budget() {
    let mut c = Controller::new(
        small_world(),
        fast_run(),
        Arc::new(bundled_names()),
        reference_ships(),
        Arc::new(QuietObserver),
        77,
    )
    .unwrap();
    let world = c.world();
    let optimal = path_weight(world, &shortest_path(world, world.origin(), world.target())).unwrap();
    assert_eq!(optimal, world.origin_to_target());

    let search_budget = 2 * i64::from(optimal);
    c.start().unwrap();
    let outcome = c.wait().unwrap();
    assert!(outcome.succeeded(), "{outcome:?}");
    let rewards = c.mission().rewards_collected() as i64;
    assert!(outcome.score - rewards <= search_budget - i64::from(optimal));
    assert!(outcome.score >= rewards);
}

#[test]
fn kill_then_new_game_from_negative_text() {
    let mut c = Controller::new(
        small_world(),
        RunConfig::default(),
        Arc::new(bundled_names()),
        reference_ships(),
        Arc::new(QuietObserver),
        1,
    )
    .unwrap();
    c.start().unwrap();
    let killed = c.kill().unwrap();
    assert!(killed.killed);
    assert!(c.mission().is_aborted());

    assert_eq!(c.new_game_from_str("-5").unwrap(), u64::MAX - 4);
    assert!(!c.is_started());
    assert!(!c.mission().is_aborted());
    assert_eq!(c.world().seed(), u64::MAX - 4);
}

// ===========================================================================
// Data files
// ===========================================================================

#[test]
fn custom_name_list_names_the_world() {
    let dir = make_test_dir("names");
    let names: Vec<String> = (0..80).map(|i| format!("Rock {i}")).collect();
    fs::write(dir.join("rocks.txt"), names.join("\n")).unwrap();
    fs::write(
        dir.join("settings.toml"),
        r#"
seed = 5
names = "rocks.txt"

[world]
width = 600
height = 600
max_nodes = 40

[run]
clock = "Unthrottled"
speed = 16
"#,
    )
    .unwrap();

    let settings = load_settings(&dir.join("settings.toml")).unwrap();
    let c = Controller::from_settings(&settings, reference_ships(), Arc::new(QuietObserver))
        .unwrap();
    let world = c.world();
    for node in world.nodes() {
        if node.id == world.origin() || node.id == world.target() {
            continue;
        }
        assert!(node.name.starts_with("Rock "), "unexpected name {}", node.name);
    }
    cleanup(&dir);
}

// ===========================================================================
// Benchmark
// ===========================================================================

#[test]
fn benchmark_over_bundled_names() {
    let seeds: Vec<u64> = (100..106).collect();
    let report = run_benchmark(&seeds, &small_world(), &bundled_names(), &fast_run(), || {
        Box::new(ReferenceSpaceship::new())
    });
    assert_eq!(report.runs, seeds.len());
    assert_eq!(report.successes, seeds.len(), "{:?}", report.results);
    assert!(report.min_score <= report.max_score);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["runs"], 6);
}
