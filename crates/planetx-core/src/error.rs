use crate::id::NodeId;
use crate::sim::Phase;

/// A run-level failure: the solver broke a rule of the mission.
///
/// Recorded once per run. Any movement attempted afterwards parks until the
/// run is aborted and then yields [`Abort`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct SolutionFailure {
    pub reason: String,
}

impl SolutionFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Cancellation marker. Carries no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("run aborted")]
pub struct Abort;

/// Misuse of the mission's phase lifecycle by a harness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissionError {
    #[error("cannot {operation} while in phase {actual:?}")]
    InvalidPhase {
        operation: &'static str,
        actual: Phase,
    },
    #[error("{operation} can only happen once per run")]
    AlreadyDone { operation: &'static str },
    #[error("node not found: {0}")]
    UnknownNode(NodeId),
    #[error("the ship is in flight")]
    InFlight,
    #[error(transparent)]
    Failed(#[from] SolutionFailure),
}

/// What a solver's phase routine returns when it does not finish normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    /// The run was aborted underneath the solver.
    #[error(transparent)]
    Aborted(#[from] Abort),
    /// The solver gave up or hit its own error.
    #[error("solver error: {0}")]
    Solver(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_displays_reason() {
        let f = SolutionFailure::new("ran out of fuel and can no longer travel");
        assert_eq!(f.to_string(), "ran out of fuel and can no longer travel");
    }

    #[test]
    fn abort_converts_into_solve_error() {
        fn step() -> Result<(), SolveError> {
            Err(Abort)?;
            Ok(())
        }
        assert_eq!(step(), Err(SolveError::Aborted(Abort)));
    }

    #[test]
    fn phase_error_names_operation() {
        let e = MissionError::InvalidPhase {
            operation: "end search",
            actual: Phase::None,
        };
        assert_eq!(e.to_string(), "cannot end search while in phase None");
    }
}
