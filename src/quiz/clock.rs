//! Session Countdown
//!
//! The clock never reads wall time itself. The runtime driver calls
//! [`SessionClock::tick`] once per elapsed second, which keeps the engine
//! deterministic and testable.

use serde::{Deserialize, Serialize};

/// Configured session length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLimit {
    /// Never expires
    #[default]
    Unbounded,
    /// Fixed length in minutes. Zero is treated as unbounded.
    Minutes(u32),
}

impl TimeLimit {
    /// Length in seconds, `None` when unbounded.
    pub fn as_secs(self) -> Option<u32> {
        match self {
            TimeLimit::Unbounded | TimeLimit::Minutes(0) => None,
            TimeLimit::Minutes(m) => Some(m.saturating_mul(60)),
        }
    }
}

/// Time left in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRemaining {
    /// No limit configured
    Unbounded,
    /// Seconds left
    Seconds(u32),
}

/// Clock lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    /// Not counting
    Stopped,
    /// Counting down (or counting up, when unbounded)
    Running,
    /// Reached zero
    Expired,
}

/// Result of one clock tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTick {
    /// Clock is not running; nothing happened
    Idle,
    /// One second elapsed
    Running(TimeRemaining),
    /// The clock just hit zero. Returned exactly once.
    Expired,
}

/// Optional countdown for a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionClock {
    state: ClockState,
    remaining_secs: Option<u32>,
}

impl SessionClock {
    /// Create a stopped clock.
    pub fn new(limit: TimeLimit) -> Self {
        Self {
            state: ClockState::Stopped,
            remaining_secs: limit.as_secs(),
        }
    }

    /// Reset to a stopped clock with a new limit.
    pub fn configure(&mut self, limit: TimeLimit) {
        *self = Self::new(limit);
    }

    /// Begin counting. Has no effect once expired.
    pub fn start(&mut self) {
        if self.state == ClockState::Stopped {
            self.state = ClockState::Running;
        }
    }

    /// Stop counting. An expired clock stays expired.
    pub fn stop(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Stopped;
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Time left.
    pub fn remaining(&self) -> TimeRemaining {
        match self.remaining_secs {
            Some(secs) => TimeRemaining::Seconds(secs),
            None => TimeRemaining::Unbounded,
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> ClockTick {
        if self.state != ClockState::Running {
            return ClockTick::Idle;
        }

        match self.remaining_secs.as_mut() {
            None => ClockTick::Running(TimeRemaining::Unbounded),
            Some(secs) => {
                *secs = secs.saturating_sub(1);
                if *secs == 0 {
                    self.state = ClockState::Expired;
                    ClockTick::Expired
                } else {
                    ClockTick::Running(TimeRemaining::Seconds(*secs))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limit_secs() {
        assert_eq!(TimeLimit::Unbounded.as_secs(), None);
        assert_eq!(TimeLimit::Minutes(0).as_secs(), None);
        assert_eq!(TimeLimit::Minutes(2).as_secs(), Some(120));
    }

    #[test]
    fn test_stopped_clock_is_idle() {
        let mut clock = SessionClock::new(TimeLimit::Minutes(1));
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert_eq!(clock.remaining(), TimeRemaining::Seconds(60));
    }

    #[test]
    fn test_countdown_expires_once() {
        let mut clock = SessionClock::new(TimeLimit::Minutes(1));
        clock.start();

        for expected in (1..60).rev() {
            assert_eq!(clock.tick(), ClockTick::Running(TimeRemaining::Seconds(expected)));
        }
        assert_eq!(clock.tick(), ClockTick::Expired);
        assert_eq!(clock.state(), ClockState::Expired);

        // Edge-triggered: later ticks do nothing
        assert_eq!(clock.tick(), ClockTick::Idle);
        clock.start();
        assert_eq!(clock.tick(), ClockTick::Idle);
    }

    #[test]
    fn test_unbounded_never_expires() {
        let mut clock = SessionClock::new(TimeLimit::Unbounded);
        clock.start();
        for _ in 0..10_000 {
            assert_eq!(clock.tick(), ClockTick::Running(TimeRemaining::Unbounded));
        }
    }

    #[test]
    fn test_stop_prevents_expiry() {
        let mut clock = SessionClock::new(TimeLimit::Minutes(1));
        clock.start();
        clock.tick();
        clock.stop();
        for _ in 0..120 {
            assert_eq!(clock.tick(), ClockTick::Idle);
        }
        assert_eq!(clock.remaining(), TimeRemaining::Seconds(59));
    }

    #[test]
    fn test_configure_resets() {
        let mut clock = SessionClock::new(TimeLimit::Minutes(1));
        clock.start();
        clock.tick();
        clock.configure(TimeLimit::Minutes(3));
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.remaining(), TimeRemaining::Seconds(180));
    }

    #[test]
    fn test_time_limit_serde() {
        let limit: TimeLimit = serde_json::from_str(r#""unbounded""#).unwrap();
        assert_eq!(limit, TimeLimit::Unbounded);
        let limit: TimeLimit = serde_json::from_str(r#"{"minutes": 5}"#).unwrap();
        assert_eq!(limit, TimeLimit::Minutes(5));
    }
}
