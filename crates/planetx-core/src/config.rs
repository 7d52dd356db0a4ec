use serde::{Deserialize, Serialize};

/// How the clock thread paces its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Accumulate wall time and run as many fixed ticks as have elapsed.
    #[default]
    Realtime,
    /// Tick as fast as possible.
    Unthrottled,
}

/// Starting fuel for the rescue phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FuelBudget {
    /// Half the total edge length plus the origin-to-target distance.
    #[default]
    Derived,
    /// A fixed amount, for harnesses and tests.
    Fixed(i64),
}

/// Movement and budget rules of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionRules {
    /// Ship speed in distance units per second.
    pub base_speed: u32,
    pub fuel_budget: FuelBudget,
}

impl Default for MissionRules {
    fn default() -> Self {
        Self {
            base_speed: 100,
            fuel_budget: FuelBudget::Derived,
        }
    }
}

/// Parameters of the clock and controller driving a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated milliseconds per tick.
    pub tick_ms: u32,
    /// Ticks applied per scheduled tick.
    pub speed: u32,
    pub clock: ClockMode,
    /// How long to wait for a previous run's threads to stop.
    pub stop_timeout_ms: u64,
    pub base_speed: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            speed: 1,
            clock: ClockMode::Realtime,
            stop_timeout_ms: 1000,
            base_speed: 100,
        }
    }
}

/// A run configuration the clock cannot drive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    Zero { field: &'static str },
    #[error(
        "base_speed {base_speed} over a {tick_ms} ms tick exceeds the per-tick travel limit"
    )]
    TickTooFar { base_speed: u32, tick_ms: u32 },
}

/// Largest `base_speed * tick_ms` product a tick represents exactly.
pub const MAX_TICK_TRAVEL: u64 = i32::MAX as u64;

impl RunConfig {
    /// Reject settings under which a ship never arrives or a tick overflows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("tick_ms", self.tick_ms),
            ("speed", self.speed),
            ("base_speed", self.base_speed),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if u64::from(self.base_speed) * u64::from(self.tick_ms) > MAX_TICK_TRAVEL {
            return Err(ConfigError::TickTooFar {
                base_speed: self.base_speed,
                tick_ms: self.tick_ms,
            });
        }
        Ok(())
    }

    /// Mission rules implied by this configuration.
    pub fn rules(&self) -> MissionRules {
        MissionRules {
            base_speed: self.base_speed,
            ..MissionRules::default()
        }
    }
}
