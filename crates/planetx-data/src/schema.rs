//! Serde structs for settings files.

use planetx_core::config::RunConfig;
use planetx_core::generate::WorldConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a settings file can specify. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldConfig,
    pub run: RunConfig,
    /// Seed of the first game. A random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Name list to use instead of the bundled one.
    pub names: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_defaults() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.world.max_nodes, 750);
        assert_eq!(s.run.tick_ms, 16);
    }

    #[test]
    fn round_trips_through_ron() {
        let s = Settings {
            seed: Some(99),
            ..Settings::default()
        };
        let text = ron::to_string(&s).unwrap();
        let back: Settings = ron::from_str(&text).unwrap();
        assert_eq!(back, s);
    }
}
