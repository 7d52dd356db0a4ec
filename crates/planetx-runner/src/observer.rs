//! Lifecycle callbacks from a run to whatever presents it.

use planetx_core::sim::Phase;
use std::sync::Mutex;

/// Receives lifecycle events of a run. All methods default to no-ops.
///
/// Called from the solver and clock threads, never while the mission lock
/// is held.
pub trait MissionObserver: Send + Sync {
    fn stage_began(&self, _phase: Phase) {}
    fn stage_ended(&self, _phase: Phase) {}
    fn game_ended(&self, _score: i64) {}
    /// Called at most once per run.
    fn failed(&self, _reason: &str) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietObserver;

impl MissionObserver for QuietObserver {}

/// Reports events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl MissionObserver for LogObserver {
    fn stage_began(&self, phase: Phase) {
        tracing::info!(?phase, "stage began");
    }

    fn stage_ended(&self, phase: Phase) {
        tracing::info!(?phase, "stage ended");
    }

    fn game_ended(&self, score: i64) {
        tracing::info!(score, "game ended");
    }

    fn failed(&self, reason: &str) {
        tracing::warn!(reason, "solution failed");
    }
}

/// One event seen by a [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    StageBegan(Phase),
    StageEnded(Phase),
    GameEnded(i64),
    Failed(String),
}

/// Keeps every event in order, for tests and post-run inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: ObservedEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

impl MissionObserver for RecordingObserver {
    fn stage_began(&self, phase: Phase) {
        self.push(ObservedEvent::StageBegan(phase));
    }

    fn stage_ended(&self, phase: Phase) {
        self.push(ObservedEvent::StageEnded(phase));
    }

    fn game_ended(&self, score: i64) {
        self.push(ObservedEvent::GameEnded(score));
    }

    fn failed(&self, reason: &str) {
        self.push(ObservedEvent::Failed(reason.to_string()));
    }
}
