//! Game lifecycle: build a world for a seed, start it, stop it, start over.
//!
//! A [`Controller`] owns at most one [`ActiveRun`]. Every (re)initialisation
//! first stops the previous run's threads, waiting up to
//! [`RunConfig::stop_timeout_ms`] before detaching them with a warning, and
//! only then generates the next world.

use crate::error::RunnerError;
use crate::observer::MissionObserver;
use crate::run::{ActiveRun, RunOutcome};
use planetx_core::config::RunConfig;
use planetx_core::generate::{WorldConfig, generate};
use planetx_core::graph::WorldGraph;
use planetx_core::mission::Mission;
use planetx_core::names::NamePool;
use planetx_core::phase::Spaceship;
use planetx_core::query::MissionSnapshot;
use planetx_data::{Settings, bundled_names, load_name_pool};
use std::sync::Arc;
use std::time::Duration;

/// Makes a fresh solver for each game.
pub type ShipFactory = Box<dyn Fn() -> Box<dyn Spaceship> + Send + Sync>;

/// A factory making `S::default()` for each game.
pub fn ships_of<S: Spaceship + Default + 'static>() -> ShipFactory {
    Box::new(|| -> Box<dyn Spaceship> { Box::new(S::default()) })
}

pub struct Controller {
    world_config: WorldConfig,
    run_config: RunConfig,
    names: Arc<NamePool>,
    ships: ShipFactory,
    observer: Arc<dyn MissionObserver>,

    seed: u64,
    mission: Arc<Mission>,
    /// Solver for the current game until `start` hands it to a thread.
    ship: Option<Box<dyn Spaceship>>,
    run: Option<ActiveRun>,
    started: bool,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("seed", &self.seed)
            .field("started", &self.started)
            .field("world_config", &self.world_config)
            .field("run_config", &self.run_config)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Build a controller with its first game generated from `seed`.
    pub fn new(
        world_config: WorldConfig,
        run_config: RunConfig,
        names: Arc<NamePool>,
        ships: ShipFactory,
        observer: Arc<dyn MissionObserver>,
        seed: u64,
    ) -> Result<Self, RunnerError> {
        run_config.validate()?;
        let mission = Arc::new(Mission::new(
            Arc::new(build_world(&world_config, seed, &names)?),
            run_config.rules(),
        ));
        let ship = ships();
        tracing::info!(seed, "game initialised");
        Ok(Self {
            world_config,
            run_config,
            names,
            ships,
            observer,
            seed,
            mission,
            ship: Some(ship),
            run: None,
            started: false,
        })
    }

    /// Build a controller from loaded settings. Uses the settings' name list
    /// if one is given, else the bundled one, and a random seed if none is
    /// given.
    pub fn from_settings(
        settings: &Settings,
        ships: ShipFactory,
        observer: Arc<dyn MissionObserver>,
    ) -> Result<Self, RunnerError> {
        let names = match &settings.names {
            Some(path) => load_name_pool(path)?,
            None => bundled_names(),
        };
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self::new(
            settings.world,
            settings.run,
            Arc::new(names),
            ships,
            observer,
            seed,
        )
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Replace the current game with a new one generated from `seed`.
    pub fn new_game(&mut self, seed: u64) -> Result<(), RunnerError> {
        self.init(seed)
    }

    /// Like [`new_game`](Self::new_game), parsing the seed from text.
    ///
    /// Negative integers are accepted and reinterpreted as their two's
    /// complement. Text that is not an integer starts a game with a random
    /// seed. Returns the seed used.
    pub fn new_game_from_str(&mut self, text: &str) -> Result<u64, RunnerError> {
        let seed = parse_seed(text).unwrap_or_else(|| {
            let seed = rand::random();
            tracing::info!(input = text, seed, "not a seed; using a random one");
            seed
        });
        self.init(seed)?;
        Ok(seed)
    }

    /// Start the current game over with the same seed and a fresh solver.
    pub fn reset(&mut self) -> Result<(), RunnerError> {
        self.init(self.seed)
    }

    /// Start the current game's solver and clock threads.
    pub fn start(&mut self) -> Result<(), RunnerError> {
        let ship = match self.ship.take() {
            Some(ship) if !self.started => ship,
            other => {
                self.ship = other;
                tracing::warn!(seed = self.seed, "game has already started");
                return Err(RunnerError::AlreadyStarted);
            }
        };
        self.started = true;
        let run = ActiveRun::spawn(
            Arc::clone(&self.mission),
            ship,
            Arc::clone(&self.observer),
            &self.run_config,
        )?;
        self.run = Some(run);
        Ok(())
    }

    /// Abort the current game and stop its threads. Returns the outcome if
    /// the game had been started.
    pub fn kill(&mut self) -> Option<RunOutcome> {
        self.mission.abort();
        self.run.take().map(|run| run.stop(self.stop_timeout()))
    }

    /// Block until the started game finishes.
    pub fn wait(&mut self) -> Option<RunOutcome> {
        self.run.take().map(ActiveRun::wait)
    }

    pub fn pause(&self) {
        if let Some(run) = &self.run {
            run.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(run) = &self.run {
            run.resume();
        }
    }

    fn init(&mut self, seed: u64) -> Result<(), RunnerError> {
        self.kill();
        self.started = false;
        self.ship = None;
        self.seed = seed;

        let world = build_world(&self.world_config, seed, &self.names)?;
        self.mission = Arc::new(Mission::new(Arc::new(world), self.run_config.rules()));
        self.ship = Some((self.ships)());
        tracing::info!(seed, "game initialised");
        Ok(())
    }

    fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.run_config.stop_timeout_ms)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &WorldGraph {
        self.mission.world()
    }

    pub fn mission(&self) -> &Arc<Mission> {
        &self.mission
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the started game's solver has returned.
    pub fn is_finished(&self) -> bool {
        self.run.as_ref().is_some_and(ActiveRun::is_finished)
    }

    pub fn search_succeeded(&self) -> bool {
        self.mission.search_succeeded()
    }

    pub fn rescue_succeeded(&self) -> bool {
        self.mission.rescue_succeeded()
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        self.mission.snapshot()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.kill();
    }
}

fn build_world(config: &WorldConfig, seed: u64, names: &NamePool) -> Result<WorldGraph, RunnerError> {
    generate(config, seed, names).map_err(|source| RunnerError::Generation { seed, source })
}

/// Parse a decimal seed, accepting the full `u64` and `i64` ranges.
fn parse_seed(text: &str) -> Option<u64> {
    let text = text.trim();
    text.parse::<u64>()
        .ok()
        .or_else(|| text.parse::<i64>().ok().map(|s| s as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{QuietObserver, RecordingObserver};
    use crate::reference::ReferenceSpaceship;
    use planetx_core::config::ClockMode;
    use planetx_core::test_utils::numbered_names;

    fn small_world() -> WorldConfig {
        WorldConfig {
            width: 400,
            height: 400,
            min_nodes: 5,
            max_nodes: 30,
            ..WorldConfig::default()
        }
    }

    fn fast() -> RunConfig {
        RunConfig {
            clock: ClockMode::Unthrottled,
            speed: 8,
            ..RunConfig::default()
        }
    }

    fn controller(seed: u64) -> Controller {
        Controller::new(
            small_world(),
            fast(),
            Arc::new(numbered_names(64)),
            ships_of::<ReferenceSpaceship>(),
            Arc::new(QuietObserver),
            seed,
        )
        .unwrap()
    }

    #[test]
    fn parse_seed_accepts_signed_and_unsigned() {
        assert_eq!(parse_seed("42"), Some(42));
        assert_eq!(parse_seed(" 7 "), Some(7));
        assert_eq!(parse_seed("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_seed("-1"), Some(u64::MAX));
        assert_eq!(parse_seed("planet"), None);
        assert_eq!(parse_seed(""), None);
    }

    #[test]
    fn start_then_wait_completes_the_game() {
        let mut c = controller(11);
        c.start().unwrap();
        let outcome = c.wait().unwrap();
        assert_eq!(outcome.seed, 11);
        assert!(outcome.succeeded(), "{outcome:?}");
        assert!(c.search_succeeded() && c.rescue_succeeded());
    }

    #[test]
    fn second_start_is_refused() {
        let mut c = controller(3);
        c.start().unwrap();
        assert!(matches!(c.start(), Err(RunnerError::AlreadyStarted)));
        c.kill();
    }

    #[test]
    fn reset_keeps_the_seed_and_allows_a_new_start() {
        let mut c = controller(5);
        let edges = c.world().edge_count();
        c.start().unwrap();
        c.reset().unwrap();
        assert_eq!(c.seed(), 5);
        assert!(!c.is_started());
        assert_eq!(c.world().edge_count(), edges);
        assert!(!c.mission().is_aborted());
        c.start().unwrap();
        assert!(c.wait().is_some());
    }

    #[test]
    fn new_game_replaces_the_world() {
        let mut c = controller(1);
        let old = Arc::clone(c.mission());
        c.new_game(2).unwrap();
        assert_eq!(c.seed(), 2);
        assert_eq!(c.world().seed(), 2);
        assert!(old.is_aborted());
    }

    #[test]
    fn new_game_from_text() {
        let mut c = controller(1);
        assert_eq!(c.new_game_from_str("99").unwrap(), 99);
        assert_eq!(c.seed(), 99);
        let seed = c.new_game_from_str("not a number").unwrap();
        assert_eq!(c.seed(), seed);
    }

    #[test]
    fn kill_before_start_aborts_without_outcome() {
        let mut c = controller(8);
        assert!(c.kill().is_none());
        assert!(c.mission().is_aborted());
    }

    #[test]
    fn kill_mid_run_reports_killed() {
        let rec = Arc::new(RecordingObserver::new());
        let mut c = Controller::new(
            small_world(),
            RunConfig::default(),
            Arc::new(numbered_names(64)),
            ships_of::<ReferenceSpaceship>(),
            rec,
            21,
        )
        .unwrap();
        c.start().unwrap();
        let outcome = c.kill().unwrap();
        assert!(outcome.killed);
        assert!(!outcome.rescue_succeeded);
    }

    #[test]
    fn invalid_run_config_is_refused_up_front() {
        for run in [
            RunConfig { base_speed: 0, ..fast() },
            RunConfig { base_speed: 200_000_000, tick_ms: 16, ..fast() },
        ] {
            let err = Controller::new(
                small_world(),
                run,
                Arc::new(numbered_names(64)),
                ships_of::<ReferenceSpaceship>(),
                Arc::new(QuietObserver),
                1,
            )
            .unwrap_err();
            assert!(matches!(err, RunnerError::Config(_)), "{err}");
        }
    }

    #[test]
    fn generation_error_names_the_seed() {
        let err = Controller::new(
            small_world(),
            fast(),
            Arc::new(numbered_names(1)),
            ships_of::<ReferenceSpaceship>(),
            Arc::new(QuietObserver),
            77,
        )
        .unwrap_err();
        assert!(matches!(err, RunnerError::Generation { seed: 77, .. }));
    }
}
