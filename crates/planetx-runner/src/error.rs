use planetx_core::config::ConfigError;
use planetx_core::generate::GenerationError;
use planetx_data::DataLoadError;

/// Errors that can occur while setting up or controlling a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The world for the requested seed could not be generated.
    #[error("world generation failed for seed {seed}: {source}")]
    Generation {
        seed: u64,
        source: GenerationError,
    },

    /// The run settings cannot drive a clock.
    #[error("invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    /// Settings or name data could not be loaded.
    #[error(transparent)]
    Data(#[from] DataLoadError),

    /// `start` was called on a game that is already running.
    #[error("game has already started")]
    AlreadyStarted,

    /// A run thread could not be spawned.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        source: std::io::Error,
    },
}
