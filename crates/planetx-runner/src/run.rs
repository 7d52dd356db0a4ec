//! One live run: a solver thread playing both phases and a clock thread
//! ticking the mission.

use crate::clock::TickSchedule;
use crate::error::RunnerError;
use crate::observer::MissionObserver;
use planetx_core::config::RunConfig;
use planetx_core::error::{MissionError, SolveError};
use planetx_core::mission::Mission;
use planetx_core::phase::Spaceship;
use planetx_core::sim::{Phase, RESCUE_WRONG_LOCATION, SEARCH_WRONG_LOCATION};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub score: i64,
    pub search_succeeded: bool,
    pub rescue_succeeded: bool,
    pub failure: Option<String>,
    /// The run was stopped from outside before it finished.
    pub killed: bool,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.search_succeeded && self.rescue_succeeded && self.failure.is_none()
    }
}

/// Observer-facing progress of a run. Every observer call goes through
/// this lock so events from the two threads arrive in a consistent order.
#[derive(Debug, Default)]
struct EventLog {
    /// Stage announced as begun and not yet ended.
    open_stage: Option<Phase>,
    /// The final event has been sent.
    closed: bool,
}

/// State shared by the solver thread, the clock thread and the owner.
struct Shared {
    mission: Arc<Mission>,
    observer: Arc<dyn MissionObserver>,
    events: Mutex<EventLog>,
    /// The solver thread has returned.
    finished: AtomicBool,
    /// The owner asked both threads to stop.
    stop: AtomicBool,
    /// The stop request arrived before the solver had returned.
    killed: AtomicBool,
    paused: AtomicBool,
}

impl Shared {
    fn events(&self) -> MutexGuard<'_, EventLog> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_stage(&self, phase: Phase) {
        let mut log = self.events();
        if log.closed {
            return;
        }
        log.open_stage = Some(phase);
        self.observer.stage_began(phase);
    }

    fn end_stage(&self) {
        let mut log = self.events();
        if let Some(phase) = log.open_stage.take() {
            self.observer.stage_ended(phase);
        }
    }

    fn finish(&self) {
        let mut log = self.events();
        if !log.closed {
            log.closed = true;
            self.observer.game_ended(self.mission.score());
        }
    }

    fn request_stop(&self) {
        if !self.finished.load(Ordering::SeqCst) {
            self.killed.store(true, Ordering::SeqCst);
        }
        self.stop.store(true, Ordering::SeqCst);
        self.mission.abort();
    }

    /// Report a failure once, whichever thread sees it first, then abort so
    /// a parked solver is released.
    fn report_failure(&self, reason: &str) {
        self.mission.fail(reason);
        {
            let mut log = self.events();
            if !log.closed {
                log.closed = true;
                if let Some(phase) = log.open_stage.take() {
                    self.observer.stage_ended(phase);
                }
                self.observer.failed(reason);
                self.observer.game_ended(self.mission.score());
            }
        }
        self.mission.abort();
    }
}

/// Threads of a started run. Dropping it aborts the mission without
/// waiting for the threads.
pub struct ActiveRun {
    shared: Arc<Shared>,
    solver: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
}

impl ActiveRun {
    /// Start the solver and clock threads.
    pub fn spawn(
        mission: Arc<Mission>,
        ship: Box<dyn Spaceship>,
        observer: Arc<dyn MissionObserver>,
        config: &RunConfig,
    ) -> Result<Self, RunnerError> {
        config.validate()?;
        let shared = Arc::new(Shared {
            mission,
            observer,
            events: Mutex::new(EventLog::default()),
            finished: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            killed: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        });

        let solver = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("planetx-solver".into())
                .spawn(move || {
                    let mut ship = ship;
                    play(&shared, ship.as_mut());
                    shared.finished.store(true, Ordering::SeqCst);
                })
                .map_err(|source| RunnerError::Spawn {
                    role: "solver",
                    source,
                })?
        };

        let clock = {
            let clock_shared = Arc::clone(&shared);
            let config = *config;
            let spawned = thread::Builder::new()
                .name("planetx-clock".into())
                .spawn(move || run_clock(&clock_shared, &config));
            match spawned {
                Ok(handle) => handle,
                Err(source) => {
                    shared.stop.store(true, Ordering::SeqCst);
                    shared.mission.abort();
                    return Err(RunnerError::Spawn {
                        role: "clock",
                        source,
                    });
                }
            }
        };

        tracing::debug!(seed = shared.mission.world().seed(), "run started");
        Ok(Self {
            shared,
            solver: Some(solver),
            clock: Some(clock),
        })
    }

    pub fn mission(&self) -> &Arc<Mission> {
        &self.shared.mission
    }

    /// Whether the solver thread has returned.
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Block until the run finishes on its own.
    pub fn wait(mut self) -> RunOutcome {
        for handle in [self.solver.take(), self.clock.take()].into_iter().flatten() {
            if handle.join().is_err() {
                tracing::warn!("run thread panicked");
                self.shared.mission.abort();
            }
        }
        self.outcome()
    }

    /// Abort the mission and wait up to `timeout` for both threads.
    ///
    /// Threads still running at the deadline are detached with a warning.
    pub fn stop(mut self, timeout: Duration) -> RunOutcome {
        self.shared.request_stop();
        let deadline = Instant::now() + timeout;
        let mut clean = true;
        for (role, handle) in [("solver", self.solver.take()), ("clock", self.clock.take())] {
            if let Some(handle) = handle {
                clean &= join_bounded(role, handle, deadline);
            }
        }
        tracing::debug!(clean, "run stopped");
        self.outcome()
    }

    /// Outcome as of now.
    pub fn outcome(&self) -> RunOutcome {
        let snap = self.shared.mission.snapshot();
        RunOutcome {
            seed: snap.seed,
            score: snap.score,
            search_succeeded: snap.search_succeeded(),
            rescue_succeeded: snap.rescue_succeeded(),
            failure: snap.failure,
            killed: self.shared.killed.load(Ordering::SeqCst),
        }
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        if self.solver.is_some() || self.clock.is_some() {
            self.shared.request_stop();
        }
    }
}

/// Run `ship` against `mission` on fresh threads and wait for the result.
pub fn run_to_completion(
    mission: Arc<Mission>,
    ship: Box<dyn Spaceship>,
    observer: Arc<dyn MissionObserver>,
    config: &RunConfig,
) -> Result<RunOutcome, RunnerError> {
    Ok(ActiveRun::spawn(mission, ship, observer, config)?.wait())
}

// ---------------------------------------------------------------------------
// Thread bodies
// ---------------------------------------------------------------------------

/// Why the solver thread stopped early.
enum Halt {
    Aborted,
    Failed(String),
}

fn play(shared: &Shared, ship: &mut dyn Spaceship) {
    match play_phases(shared, ship) {
        Ok(()) => shared.finish(),
        Err(Halt::Failed(reason)) => shared.report_failure(&reason),
        Err(Halt::Aborted) => tracing::debug!("solver cancelled"),
    }
}

fn play_phases(shared: &Shared, ship: &mut dyn Spaceship) -> Result<(), Halt> {
    let mission = &shared.mission;
    let failed = |e: MissionError| Halt::Failed(e.to_string());

    shared.begin_stage(Phase::Search);
    let search = mission.begin_search().map_err(failed)?;
    settle(ship.search(&search))?;
    if !mission.end_search().map_err(failed)? {
        return Err(Halt::Failed(failure_or(mission, SEARCH_WRONG_LOCATION)));
    }
    shared.end_stage();

    shared.begin_stage(Phase::Rescue);
    let rescue = mission.begin_rescue().map_err(failed)?;
    settle(ship.rescue(&rescue))?;
    if !mission.end_rescue().map_err(failed)? {
        return Err(Halt::Failed(failure_or(mission, RESCUE_WRONG_LOCATION)));
    }
    shared.end_stage();
    Ok(())
}

fn settle(result: Result<(), SolveError>) -> Result<(), Halt> {
    match result {
        Ok(()) => Ok(()),
        Err(SolveError::Aborted(_)) => Err(Halt::Aborted),
        Err(SolveError::Solver(message)) => Err(Halt::Failed(message)),
    }
}

/// The run's recorded failure, or `fallback` if none was recorded.
fn failure_or(mission: &Mission, fallback: &str) -> String {
    mission
        .failure()
        .map(|f| f.reason)
        .unwrap_or_else(|| fallback.to_string())
}

fn run_clock(shared: &Shared, config: &RunConfig) {
    let mut schedule = TickSchedule::new(config);
    let mut last = Instant::now();
    tracing::debug!(tick_ms = config.tick_ms, speed = config.speed, clock = ?config.clock, "clock started");

    'ticking: while !shared.finished.load(Ordering::SeqCst) && !shared.stop.load(Ordering::SeqCst) {
        match (shared.paused.load(Ordering::SeqCst), schedule.is_paused()) {
            (true, false) => schedule.pause(),
            (false, true) => schedule.resume(),
            _ => {}
        }

        let now = Instant::now();
        let due = schedule.due(now - last);
        last = now;
        for _ in 0..due {
            if let Err(failure) = shared.mission.advance(config.tick_ms) {
                shared.report_failure(&failure.reason);
                break 'ticking;
            }
            if shared.mission.is_aborted() {
                break 'ticking;
            }
        }

        let idle = schedule.idle();
        if idle.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(idle);
        }
    }
    tracing::debug!("clock stopped");
}

/// Join `handle` if it finishes before `deadline`; otherwise warn and
/// detach it.
fn join_bounded(role: &str, handle: JoinHandle<()>, deadline: Instant) -> bool {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!(role, "run thread did not stop in time; detaching it");
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
    if handle.join().is_err() {
        tracing::warn!(role, "run thread panicked");
    }
    true
}
