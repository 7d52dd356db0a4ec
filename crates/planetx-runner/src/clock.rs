//! Fixed-step tick scheduling for the clock thread.
//!
//! In [`ClockMode::Realtime`] elapsed wall time is accumulated and as many
//! whole ticks as fit are released, carrying the remainder forward. In
//! [`ClockMode::Unthrottled`] one tick is released per poll. Each released
//! tick is applied `speed` times.

use planetx_core::config::{ClockMode, RunConfig};
use std::time::Duration;

/// Upper bound on ticks released by one poll, so a stalled clock thread
/// does not fast-forward the ship across many edges at once.
const MAX_CATCH_UP: u32 = 8;

#[derive(Debug, Clone)]
pub struct TickSchedule {
    mode: ClockMode,
    tick: Duration,
    speed: u32,
    accumulator: Duration,
    paused: bool,
}

impl TickSchedule {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            mode: config.clock,
            tick: Duration::from_millis(u64::from(config.tick_ms.max(1))),
            speed: config.speed.max(1),
            accumulator: Duration::ZERO,
            paused: false,
        }
    }

    /// Number of `advance` calls to make after `elapsed` wall time.
    pub fn due(&mut self, elapsed: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        let ticks = match self.mode {
            ClockMode::Unthrottled => 1,
            ClockMode::Realtime => {
                self.accumulator += elapsed;
                let mut ticks = 0;
                while self.accumulator >= self.tick {
                    self.accumulator -= self.tick;
                    ticks += 1;
                }
                if ticks > MAX_CATCH_UP {
                    ticks = MAX_CATCH_UP;
                }
                ticks
            }
        };
        ticks * self.speed
    }

    /// How long the clock thread should sleep between polls.
    pub fn idle(&self) -> Duration {
        match self.mode {
            ClockMode::Realtime if !self.paused => self.tick.saturating_sub(self.accumulator),
            ClockMode::Realtime => self.tick,
            ClockMode::Unthrottled if self.paused => Duration::from_millis(1),
            ClockMode::Unthrottled => Duration::ZERO,
        }
    }

    /// Stop releasing ticks. Time passed while paused is discarded.
    pub fn pause(&mut self) {
        self.paused = true;
        self.accumulator = Duration::ZERO;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn realtime(tick_ms: u32, speed: u32) -> TickSchedule {
        TickSchedule::new(&RunConfig {
            tick_ms,
            speed,
            clock: ClockMode::Realtime,
            ..RunConfig::default()
        })
    }

    #[test]
    fn realtime_accumulates_remainder() {
        let mut s = realtime(16, 1);
        assert_eq!(s.due(Duration::from_millis(10)), 0);
        assert_eq!(s.due(Duration::from_millis(10)), 1);
        // 4 ms carried, plus 30 = 34: two ticks, 2 ms left.
        assert_eq!(s.due(Duration::from_millis(30)), 2);
        assert_eq!(s.due(Duration::from_millis(14)), 1);
    }

    #[test]
    fn speed_multiplies_ticks() {
        let mut s = realtime(10, 4);
        assert_eq!(s.due(Duration::from_millis(25)), 8);
    }

    #[test]
    fn catch_up_is_bounded() {
        let mut s = realtime(1, 1);
        assert_eq!(s.due(Duration::from_secs(5)), MAX_CATCH_UP);
    }

    #[test]
    fn unthrottled_releases_one_tick_per_poll() {
        let mut s = TickSchedule::new(&RunConfig {
            clock: ClockMode::Unthrottled,
            speed: 3,
            ..RunConfig::default()
        });
        assert_eq!(s.due(Duration::ZERO), 3);
        assert_eq!(s.idle(), Duration::ZERO);
    }

    #[test]
    fn pause_discards_time() {
        let mut s = realtime(16, 1);
        s.due(Duration::from_millis(15));
        s.pause();
        assert!(s.is_paused());
        assert_eq!(s.due(Duration::from_secs(1)), 0);
        s.resume();
        assert_eq!(s.due(Duration::from_millis(15)), 0);
        assert_eq!(s.due(Duration::from_millis(1)), 1);
    }
}
